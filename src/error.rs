use thiserror::Error;

/// Service level error returned by the catalog, the store and the converter.
///
/// Per-link parse failures never reach this type; they are absorbed by
/// [`crate::parser::explodes::explode_batch`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Name already exists: {0}")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to fetch subscription: {0}")]
    ExternalFetch(String),

    #[error("Only built-in rules can be restored: {0}")]
    NotRestorable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to render profile: {0}")]
    Render(String),
}

/// Coarse classification used by the web layer to choose a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadInput,
    NotFound,
    ServerFault,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Validation(_) | Error::DuplicateName(_) | Error::NotRestorable(_) => {
                ErrorClass::BadInput
            }
            Error::NotFound(_) => ErrorClass::NotFound,
            Error::ExternalFetch(_) | Error::Storage(_) | Error::Render(_) => {
                ErrorClass::ServerFault
            }
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(format!("invalid stored value: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
