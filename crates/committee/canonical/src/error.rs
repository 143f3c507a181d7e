use thiserror::Error;

/// Errors converting typed values into canonical form.
#[derive(Error, Debug)]
pub enum CanonicalError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
