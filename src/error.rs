// Error taxonomy for providers and observers

use thiserror::Error;

/// Failure reported by an OS metrics provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("provider lock poisoned: {0}")]
    Lock(String),

    #[error("metric unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ObserverError {
    /// An enumerated interface vanished before its addresses could be read.
    #[error("network interface {0} doesn't exist")]
    UnknownInterface(String),

    /// The link stats snapshot of this tick has no entry for the interface.
    #[error("missing stats for network interface {0}")]
    MissingStats(String),

    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("provider task join: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ObserverError>;
