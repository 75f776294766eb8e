use crate::value::EnvValue;

/// Failure raised by the first directive that rejects a variable.
///
/// Every message names the variable and, where it helps, the rule and the
/// offending value, so it can be shown to an operator as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Environment variable '{key}' is required but missing or empty")]
    MissingRequired { key: String },

    #[error("Environment variable '{key}' must be {expected}, got '{value}'")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        value: EnvValue,
    },

    #[error("Environment variable '{key}' must be a valid {format}")]
    InvalidFormat { key: String, format: &'static str },

    #[error("Environment variable '{key}' must {limit}")]
    RangeError {
        key: String,
        rule: &'static str,
        limit: String,
    },

    #[error("Environment variable '{key}' must be equal to '{expected}'")]
    NotEqual { key: String, expected: String },

    #[error("Rule '{rule}' on environment variable '{key}' requires a parameter")]
    MissingParam { key: String, rule: &'static str },

    #[error("Rule '{rule}' on environment variable '{key}' has a non-numeric parameter '{param}'")]
    InvalidParam {
        key: String,
        rule: &'static str,
        param: String,
    },

    #[error("Environment variable '{key}' cannot be validated with '{rule}' rule")]
    Unvalidatable { key: String, rule: &'static str },

    #[error("Unknown validation rule '{rule}' for environment variable '{key}'")]
    UnknownRule { key: String, rule: String },
}

/// Fieldless tag for each [`ValidationError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRequired,
    TypeMismatch,
    InvalidFormat,
    RangeError,
    NotEqual,
    MissingParam,
    InvalidParam,
    Unvalidatable,
    UnknownRule,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequired { .. } => ErrorKind::MissingRequired,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::RangeError { .. } => ErrorKind::RangeError,
            Self::NotEqual { .. } => ErrorKind::NotEqual,
            Self::MissingParam { .. } => ErrorKind::MissingParam,
            Self::InvalidParam { .. } => ErrorKind::InvalidParam,
            Self::Unvalidatable { .. } => ErrorKind::Unvalidatable,
            Self::UnknownRule { .. } => ErrorKind::UnknownRule,
        }
    }

    /// Name of the variable whose rule list failed.
    pub fn key(&self) -> &str {
        match self {
            Self::MissingRequired { key }
            | Self::TypeMismatch { key, .. }
            | Self::InvalidFormat { key, .. }
            | Self::RangeError { key, .. }
            | Self::NotEqual { key, .. }
            | Self::MissingParam { key, .. }
            | Self::InvalidParam { key, .. }
            | Self::Unvalidatable { key, .. }
            | Self::UnknownRule { key, .. } => key,
        }
    }
}
