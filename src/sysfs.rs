use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::config::{DEFAULT_GPIO_BASE, Direction, EdgeDetect};
use crate::error::AppError;

/// Settle time after a fresh export; udev may still be adjusting ownership
/// of the new control directory when the export write returns.
const EXPORT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Pin configuration through the sysfs GPIO interface. All writes are
/// one-shot; a pin the kernel will not let us configure is a fatal error for
/// the caller, never retried.
pub struct SysfsGpio {
    base: PathBuf,
}

impl SysfsGpio {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    fn pin_dir(&self, pin: u32) -> PathBuf {
        self.base.join(format!("gpio{pin}"))
    }

    fn control_file(&self, pin: u32, name: &str) -> PathBuf {
        self.pin_dir(pin).join(name)
    }

    /// Export `pin` by writing its number to `<base>/export`. A pin whose
    /// control directory already exists is left untouched.
    pub fn export(&self, pin: u32) -> Result<(), AppError> {
        if self.pin_dir(pin).is_dir() {
            debug!("pin {pin} is already exported");
            return Ok(());
        }

        let export_path = self.base.join("export");
        let mut file = OpenOptions::new()
            .write(true)
            .open(&export_path)
            .map_err(|e| AppError::Sysfs(format!("open {}: {e}", export_path.display())))?;
        file.write_all(format!("{pin}\n").as_bytes())
            .map_err(|e| AppError::Sysfs(format!("export pin {pin}: {e}")))?;

        thread::sleep(EXPORT_SETTLE_DELAY);
        info!("exported pin {pin}");
        Ok(())
    }

    pub fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), AppError> {
        self.write_control(pin, "direction", direction.as_str())
    }

    pub fn set_edge(&self, pin: u32, edge: EdgeDetect) -> Result<(), AppError> {
        self.write_control(pin, "edge", edge.as_str())
    }

    /// Open `<base>/gpioN/value` read-only for edge monitoring.
    pub fn open_value(&self, pin: u32) -> Result<File, AppError> {
        let path = self.control_file(pin, "value");
        File::open(&path).map_err(|e| AppError::Sysfs(format!("open {}: {e}", path.display())))
    }

    fn write_control(&self, pin: u32, name: &str, value: &str) -> Result<(), AppError> {
        if !self.pin_dir(pin).is_dir() {
            return Err(AppError::NotExported(pin));
        }

        let path = self.control_file(pin, name);
        let mut file = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|e| AppError::Sysfs(format!("open {}: {e}", path.display())))?;
        file.write_all(format!("{value}\n").as_bytes())
            .map_err(|e| AppError::Sysfs(format!("write {}: {e}", path.display())))?;

        debug!("pin {pin}: {name} = {value}");
        Ok(())
    }
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new(DEFAULT_GPIO_BASE)
    }
}
