use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::os::fd::AsFd;
use std::time::Instant;

use log::{debug, info, warn};
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

use crate::config::{PinConfig, WatchConfig};
use crate::debounce::Debouncer;
use crate::dispatch::ScriptDispatcher;
use crate::error::AppError;
use crate::sysfs::SysfsGpio;

struct WatchedPin {
    number: u32,
    file: File,
    debounce: Debouncer,
}

/// Multiplexes kernel edge notifications across every configured pin.
///
/// One value-file descriptor per pin is held open for the whole run; the
/// slot order is fixed by the configured pin order. Handler scripts run
/// synchronously, so dispatch for one pin blocks observation of all others
/// until the child exits.
pub struct PinWatcher {
    pins: Vec<WatchedPin>,
    dispatcher: ScriptDispatcher,
}

impl PinWatcher {
    /// Open the value file of every configured pin. The pins must already
    /// have been exported and configured through [`SysfsGpio`].
    pub fn new(config: &WatchConfig, gpio: &SysfsGpio) -> Result<Self, AppError> {
        let mut pins = Vec::with_capacity(config.pins.len());
        for cfg in &config.pins {
            pins.push(Self::open_pin(cfg, gpio)?);
        }

        Ok(Self {
            pins,
            dispatcher: ScriptDispatcher::new(&config.script_dir),
        })
    }

    fn open_pin(cfg: &PinConfig, gpio: &SysfsGpio) -> Result<WatchedPin, AppError> {
        let mut file = gpio.open_value(cfg.number)?;

        // Discard read: clears readiness left over from configuration and
        // seeds the debouncer with the line's current level.
        let level = read_level(&mut file)
            .map_err(|e| AppError::Sysfs(format!("read pin {} value: {e}", cfg.number)))?;

        Ok(WatchedPin {
            number: cfg.number,
            file,
            debounce: Debouncer::new(cfg.edge, cfg.debounce, level),
        })
    }

    /// Block on edge notifications until the process is terminated. A failed
    /// wait is the only way out of the loop.
    pub fn run(&mut self) -> Result<(), AppError> {
        info!("watching {} pin(s)", self.pins.len());

        loop {
            for idx in self.wait()? {
                self.service(idx);
            }
        }
    }

    fn wait(&self) -> Result<Vec<usize>, AppError> {
        let mut fds: Vec<PollFd> = self
            .pins
            .iter()
            .map(|pin| PollFd::new(pin.file.as_fd(), PollFlags::POLLPRI))
            .collect();

        poll(&mut fds, PollTimeout::NONE).map_err(|e| AppError::Poll(e.to_string()))?;

        Ok(fds
            .iter()
            .enumerate()
            .filter(|(_, fd)| {
                fd.revents()
                    .is_some_and(|revents| revents.contains(PollFlags::POLLPRI))
            })
            .map(|(idx, _)| idx)
            .collect())
    }

    fn service(&mut self, idx: usize) {
        let pin = &mut self.pins[idx];

        let level = match read_level(&mut pin.file) {
            Ok(level) => level,
            Err(e) => {
                warn!("pin {}: value read failed: {e}", pin.number);
                return;
            }
        };

        debug!("pin {}: raw level {}", pin.number, level as u8);
        if let Some(value) = pin.debounce.sample(level, Instant::now()) {
            self.dispatcher.run(pin.number, value as u8);
        }
    }
}

fn read_level(file: &mut File) -> std::io::Result<bool> {
    let mut buf = [0u8; 2];
    file.seek(SeekFrom::Start(0))?;
    let n = file.read(&mut buf)?;
    Ok(n > 0 && buf[0] == b'1')
}
