mod config;
mod debounce;
mod dispatch;
mod error;
mod sysfs;
mod watcher;

pub use config::{
    DEFAULT_GPIO_BASE, DEFAULT_SCRIPT_DIR, Direction, EdgeDetect, PinConfig, WatchConfig,
};
pub use debounce::Debouncer;
pub use dispatch::{ScriptDispatcher, ScriptOutcome};
pub use error::AppError;
pub use sysfs::SysfsGpio;
pub use watcher::PinWatcher;
