use snafu::Snafu;

use crate::name::ResourceError;

/// Categories of errors for classification and handling.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input, user error
    Validation,

    /// Resource missing
    NotFound,

    /// Resource already exists
    Conflict,

    /// Throttling or transport errors, retry possible
    Temporary,

    /// Bugs, system errors
    Internal,
}

impl ErrorKind {
    /// Whether this error is retryable.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Temporary)
    }

    /// Standard exit code for this error category.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Validation => 64, // EX_USAGE
            Self::NotFound => 66,   // EX_NOINPUT
            Self::Temporary => 75,  // EX_TEMPFAIL
            _ => 70,                // EX_SOFTWARE
        }
    }
}

#[derive(Debug, Clone, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("{resource} not found: {message}"))]
    NotFound {
        resource: &'static str,
        message: String,
    },
    #[snafu(display("{resource} already exists: {message}"))]
    AlreadyExists {
        resource: &'static str,
        message: String,
    },
    #[snafu(display("invalid {resource} argument: {message}"))]
    InvalidArgument {
        resource: &'static str,
        message: String,
    },
    #[snafu(display("invalid {resource} name"))]
    InvalidResourceName {
        resource: &'static str,
        source: ResourceError,
    },
    #[snafu(display("request throttled: {message}"))]
    Throttled { message: String },
    #[snafu(display("store unavailable: {message}"))]
    Unavailable { message: String },
    #[snafu(display("internal error: {message}"))]
    Internal { message: String },
}

pub type Result<T, E = StoreError> = ::std::result::Result<T, E>;

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::AlreadyExists { .. } => ErrorKind::Conflict,
            StoreError::InvalidArgument { .. } | StoreError::InvalidResourceName { .. } => {
                ErrorKind::Validation
            }
            StoreError::Throttled { .. } | StoreError::Unavailable { .. } => ErrorKind::Temporary,
            StoreError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, StoreError::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        let conflict = StoreError::AlreadyExists {
            resource: "table",
            message: "PetMetricsTable".to_string(),
        };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(!conflict.kind().is_retryable());

        let throttled = StoreError::Throttled {
            message: "slow down".to_string(),
        };
        assert!(throttled.kind().is_retryable());
        assert_eq!(throttled.kind().exit_code(), 75);
    }
}
