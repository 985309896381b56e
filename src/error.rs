use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Intake closed, job {0} was not admitted")]
    IntakeClosed(u64),

    #[error("Task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
