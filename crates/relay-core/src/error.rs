use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The payload matched no schema and is not a flat string-valued object.
    #[error("decoding json to map: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
