use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

/// How one handler invocation ended. A missing script and an unhappy child
/// are both normal operating states for the daemon, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// No handler installed for the pin.
    Missing,
    /// Child ran to completion with the given exit status.
    Exited(i32),
    /// Child was terminated by a signal.
    Signaled(i32),
    /// Child could not be spawned.
    Failed,
}

/// Runs the per-pin handler script for an accepted edge event.
///
/// The handler for pin N is the executable file named `N` in the script
/// directory, invoked as `<script> <pin> <value>` and waited for before the
/// caller resumes polling.
pub struct ScriptDispatcher {
    script_dir: PathBuf,
}

impl ScriptDispatcher {
    pub fn new<P: AsRef<Path>>(script_dir: P) -> Self {
        Self {
            script_dir: script_dir.as_ref().to_path_buf(),
        }
    }

    pub fn run(&self, pin: u32, value: u8) -> ScriptOutcome {
        let script = self.script_dir.join(pin.to_string());
        if !script.is_file() {
            warn!("pin {pin}: no handler script at {}", script.display());
            return ScriptOutcome::Missing;
        }

        debug!("pin {pin}: running {} {pin} {value}", script.display());
        let status = match Command::new(&script)
            .arg(pin.to_string())
            .arg(value.to_string())
            .status()
        {
            Ok(status) => status,
            Err(e) => {
                warn!("pin {pin}: failed to run {}: {e}", script.display());
                return ScriptOutcome::Failed;
            }
        };

        if let Some(code) = status.code() {
            if code != 0 {
                warn!("pin {pin}: handler exited with status {code}");
            }
            ScriptOutcome::Exited(code)
        } else if let Some(signal) = status.signal() {
            warn!("pin {pin}: handler killed by signal {signal}");
            ScriptOutcome::Signaled(signal)
        } else {
            ScriptOutcome::Failed
        }
    }
}
