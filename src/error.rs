use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocFlowError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("layout cancelled after {rows_placed} table rows")]
    Cancelled { rows_placed: usize },
    #[error("font error: {0}")]
    Font(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocFlowError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DocFlowError::InvalidInput(message.into())
    }
}
