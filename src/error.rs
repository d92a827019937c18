use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CuckooFilterError {
    #[error("invalid shape: `{0}`")]
    InvalidShape(String),
    #[error("sizing overflow: `{0}`")]
    SizeOverflow(String),
    #[error("malformed serialized filter: `{0}`")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, CuckooFilterError>;
