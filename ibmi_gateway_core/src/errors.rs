use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid object name for {field}: {value:?}")]
    InvalidObjectName { field: &'static str, value: String },

    #[error("invalid object type filter: {value:?}")]
    InvalidObjectType { value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
