use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresignError {
    #[error("object key must not be empty")]
    EmptyKey,

    #[error("expiry of {0}s is outside the allowed range of 1..=604800 seconds")]
    ExpiryOutOfRange(u64),

    #[error("storage bucket is not configured")]
    MissingBucket,

    #[error("storage credentials are not configured")]
    MissingCredentials,

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

pub type PresignResult<T> = Result<T, PresignError>;
