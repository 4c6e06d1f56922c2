use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid pin spec: {0}")]
    PinSpec(String),
    #[error("pin {0} is not exported")]
    NotExported(u32),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("sysfs error: {0}")]
    Sysfs(String),
    #[error("poll error: {0}")]
    Poll(String),
}
