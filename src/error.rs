//! Error types for the security binding engine.

use thiserror::Error;

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindingError>;

/// Errors raised while assembling or describing a security binding.
///
/// Recognition mismatches are not errors; recognizers return `Option`.
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("The value {value} is invalid for enum type '{type_name}'")]
    InvalidEnumValue { value: i64, type_name: &'static str },

    #[error("Unified security mode {bits:#x} cannot be projected onto '{type_name}'")]
    UnmappedUnifiedMode { bits: u32, type_name: &'static str },

    #[error("Value for '{0}' cannot be empty")]
    EmptyArgument(&'static str),

    #[error("Invalid namespace URI '{namespace}': {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    #[error("Encoding '{encoding}' is not supported by the {family} binding")]
    UnsupportedEncoding {
        encoding: &'static str,
        family: &'static str,
    },

    #[error("Unsupported security combination: {0}")]
    UnsupportedCombination(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindingError {
    /// Shorthand for an [`BindingError::UnsupportedCombination`].
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedCombination(message.into())
    }
}

/// Validate that a namespace is empty or an absolute URI.
pub(crate) fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Ok(());
    }
    url::Url::parse(namespace)
        .map(|_| ())
        .map_err(|e| BindingError::InvalidNamespace {
            namespace: namespace.to_string(),
            reason: e.to_string(),
        })
}

/// Validate that a required string argument is not empty.
pub(crate) fn require_non_empty(argument: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(BindingError::EmptyArgument(argument));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_enum_message_cites_value_and_type() {
        let err = BindingError::InvalidEnumValue {
            value: 7,
            type_name: "ProtectionLevel",
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("ProtectionLevel"));
    }

    #[test]
    fn test_validate_namespace() {
        assert!(validate_namespace("").is_ok());
        assert!(validate_namespace("http://www.w3.org/2005/08/addressing").is_ok());
        assert!(validate_namespace("urn:oasis:names:tc:SAML:2.0:assertion").is_ok());
        assert!(matches!(
            validate_namespace("not a uri"),
            Err(BindingError::InvalidNamespace { .. })
        ));
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("name", "Sender").is_ok());
        assert!(matches!(
            require_non_empty("name", ""),
            Err(BindingError::EmptyArgument("name"))
        ));
    }

    #[test]
    fn test_io_error_converts() {
        let err: BindingError = std::io::Error::other("disk").into();
        assert!(matches!(err, BindingError::Io(_)));
    }
}
