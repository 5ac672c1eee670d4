use thiserror::Error;

pub type Result<T> = std::result::Result<T, CartError>;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(String),
}
