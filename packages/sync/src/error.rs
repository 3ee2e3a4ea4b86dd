use drafter_props::PropsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid buffer path: {0}")]
    InvalidPath(String),

    #[error("Buffer lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Props error: {0}")]
    Props(#[from] PropsError),

    #[error("Invalid sync config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sync task failed: {0}")]
    Task(String),
}

pub type SyncResult<T> = Result<T, SyncError>;
