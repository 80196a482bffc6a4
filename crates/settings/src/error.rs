//! Error types for the settings synchronization flow.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("failed to fetch settings: {0}")]
    FetchFailed(String),

    #[error("failed to save settings: {0}")]
    SaveFailed(String),

    #[error("settings response was not valid: {0}")]
    ParseFailed(String),

    #[error("invalid settings update: {0}")]
    InvalidUpdate(String),

    #[error("settings client could not be initialised: {0}")]
    ClientInit(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
