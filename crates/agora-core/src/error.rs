use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid search options: {0}")]
    InvalidOptions(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("cancelled")]
    Cancelled,

    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Wrap a collaborator failure, keeping the full context chain.
    pub fn unavailable(err: &anyhow::Error) -> Self {
        Self::Unavailable(format!("{err:#}"))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
