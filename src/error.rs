//! Errors surfaced by `QueryBuilder::build` and document rendering.

use std::fmt;

/// Failure kinds of a build.
#[derive(Debug)]
pub enum BuildError {
    /// No doc type, filter or condition was ever set on the builder.
    EmptySelector,
    /// A value could not be encoded as JSON.
    Encoding(serde_json::Error),
}

pub type BuildResult<T> = Result<T, BuildError>;

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::EmptySelector => {
                write!(f, "no doctype, filters or conditions have been added for the selector")
            }
            BuildError::Encoding(e) => write!(f, "failed to encode query: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::EmptySelector => None,
            BuildError::Encoding(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(e: serde_json::Error) -> Self {
        BuildError::Encoding(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_empty_selector_message() {
        let err = BuildError::EmptySelector;
        assert!(err.to_string().contains("selector"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_encoding_error_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BuildError = json_err.into();
        assert!(matches!(err, BuildError::Encoding(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("failed to encode query"));
    }
}
