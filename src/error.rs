use serde::{Deserialize, Serialize};

use crate::capabilities::{DirectoryError, DispatchError, LocationError};
use crate::incident::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Construction-time misconfiguration. Fatal to incident creation.
    InvalidConfig,
    /// Snapshot capture failed; the incident proceeds without a location.
    Location,
    /// Contact directory could not be loaded.
    Directory,
    /// An individual notification attempt failed.
    Dispatch,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::Location => "LOCATION_ERROR",
            Self::Directory => "DIRECTORY_ERROR",
            Self::Dispatch => "DISPATCH_ERROR",
        }
    }

    /// Whether the safety flow keeps going despite this error. Everything
    /// except misconfiguration degrades gracefully.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        !matches!(self, Self::InvalidConfig)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        Self::new(ErrorKind::InvalidConfig, e.to_string())
    }
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        Self::new(ErrorKind::Location, e.to_string())
    }
}

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        Self::new(ErrorKind::Directory, e.to_string())
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        Self::new(ErrorKind::Dispatch, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorKind::InvalidConfig.code(), "INVALID_CONFIG");
        assert_eq!(ErrorKind::Location.code(), "LOCATION_ERROR");
        assert_eq!(ErrorKind::Directory.code(), "DIRECTORY_ERROR");
        assert_eq!(ErrorKind::Dispatch.code(), "DISPATCH_ERROR");
    }

    #[test]
    fn only_config_errors_are_fatal() {
        assert!(!ErrorKind::InvalidConfig.is_recoverable());
        assert!(ErrorKind::Location.is_recoverable());
        assert!(ErrorKind::Directory.is_recoverable());
        assert!(ErrorKind::Dispatch.is_recoverable());
    }

    #[test]
    fn config_error_converts_with_code() {
        let err: AppError = ConfigError::NegativeDuration(-5).into();
        assert_eq!(err.code(), "INVALID_CONFIG");
        assert!(err.message.contains("-5"));
    }
}
