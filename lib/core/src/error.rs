use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Dataset or guideline corpus is missing, malformed or schema-incompatible.
    #[error("Reference data error: {0}")]
    ReferenceData(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Unknown nutrient: {0}")]
    UnknownNutrient(String),

    #[error("Invalid user input: {0}")]
    InvalidUserInput(String),

    /// Embedding backend or index query failed.
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Transient upstream failures are the only kind a caller should retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Embedding(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
