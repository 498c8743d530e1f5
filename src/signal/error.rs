use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),
    #[error("period must be a positive number of seconds, got {0}")]
    InvalidPeriod(f64),
    #[error("channel name must not be empty")]
    EmptyChannelName,
    #[error("channel {0:?} is already monitored")]
    DuplicateChannel(String),
    #[error("no channel named {0:?}")]
    UnknownChannel(String),
    #[error("scan log I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scan configuration: {0}")]
    Config(#[from] serde_json::Error),
}
