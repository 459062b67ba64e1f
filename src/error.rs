use serde::Serialize;
use std::fmt;

/// Coarse classification shared by every domain error.
///
/// The transport layer maps a kind to a status code; the core never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    NotAuthenticated,
    ValidationError,
    Conflict,
    StateError,
    LimitExceeded,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::NotAuthenticated => "not_authenticated",
            Self::ValidationError => "validation_error",
            Self::Conflict => "conflict",
            Self::StateError => "state_error",
            Self::LimitExceeded => "limit_exceeded",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}
