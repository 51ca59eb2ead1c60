use std::fmt::{Display, Formatter, Result};

use crate::{course_catalog::CatalogError, file_storage::StorageError};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    DbError(String),
    SettingsError(String),
    InvalidInput(String),
    NotAuthorized(String),
    StorageLookupFailure(String),
    DeletionFailure(String),
    DeletionDisabled,
    ReportDisabled,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Error::DbError(message) => write!(f, "Database error: {}", message),
            Error::SettingsError(message) => write!(f, "Settings error: {}", message),
            Error::InvalidInput(message) => write!(f, "Invalid input: {}", message),
            Error::NotAuthorized(message) => write!(f, "Not authorized: {}", message),
            Error::StorageLookupFailure(message) => {
                write!(f, "Storage lookup failed: {}", message)
            }
            Error::DeletionFailure(message) => write!(f, "Deletion failed: {}", message),
            Error::DeletionDisabled => write!(f, "File deletion is disabled"),
            Error::ReportDisabled => write!(f, "File usage report is disabled"),
        }
    }
}

impl std::error::Error for Error {}

impl From<database::database_error::DatabaseError> for Error {
    fn from(err: database::database_error::DatabaseError) -> Self {
        Error::DbError(err.to_string())
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DeleteFailed(_) => Error::DeletionFailure(err.to_string()),
            StorageError::LookupFailed(_) => Error::StorageLookupFailure(err.to_string()),
        }
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Error::StorageLookupFailure(err.to_string())
    }
}
