//! Error types for secret resolution.

use thiserror::Error;

/// Result type alias using [`SecretfigError`].
pub type Result<T> = std::result::Result<T, SecretfigError>;

/// Errors that can occur while resolving configuration values.
///
/// Fetch failures fall into two families: backend errors (the remote call
/// failed or returned the wrong kind of payload) and decode errors (a
/// parameter store binary value was not valid base64). Use
/// [`is_backend_error`](SecretfigError::is_backend_error) and
/// [`is_decode_error`](SecretfigError::is_decode_error) to tell them apart
/// through any context wrappers.
#[derive(Debug, Error)]
pub enum SecretfigError {
    /// Secret or parameter was not found in the backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend holds no payload of the requested kind.
    #[error("{identifier} has no {payload} value")]
    MissingPayload {
        /// Identifier that was fetched
        identifier: String,
        /// Payload kind that was requested ("string" or "binary")
        payload: &'static str,
    },

    /// SDK backend used before `init()` was called.
    #[error("backend not initialized")]
    NotInitialized,

    /// A text-encoded binary value was not valid base64.
    #[error("error decoding binary value {identifier}: {source}")]
    Decode {
        /// Identifier that was fetched
        identifier: String,
        /// Underlying decode error
        #[source]
        source: base64::DecodeError,
    },

    /// Backend operation failed with context.
    #[error("{backend}: {operation} {identifier}: {source}")]
    BackendOperation {
        /// Backend name
        backend: String,
        /// Operation name (fetch_string, fetch_binary)
        operation: String,
        /// Identifier passed to the backend
        identifier: String,
        /// Underlying error
        #[source]
        source: Box<SecretfigError>,
    },

    /// Resolving the value at a key path failed.
    #[error("resolving {key}: {source}")]
    Resolve {
        /// Dotted key path of the leaf
        key: String,
        /// Underlying error
        #[source]
        source: Box<SecretfigError>,
    },

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error (catch-all, usually a transport failure).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SecretfigError {
    /// Creates a backend operation error with context.
    ///
    /// # Example
    ///
    /// ```
    /// use secretfig::SecretfigError;
    ///
    /// let err = SecretfigError::NotFound("db-password".to_string());
    /// let wrapped = SecretfigError::backend_op(
    ///     "secretsmanager",
    ///     "fetch_string",
    ///     "db-password",
    ///     err,
    /// );
    ///
    /// assert_eq!(
    ///     wrapped.to_string(),
    ///     "secretsmanager: fetch_string db-password: not found: db-password"
    /// );
    /// ```
    pub fn backend_op(
        backend: impl Into<String>,
        operation: impl Into<String>,
        identifier: impl Into<String>,
        err: SecretfigError,
    ) -> Self {
        Self::BackendOperation {
            backend: backend.into(),
            operation: operation.into(),
            identifier: identifier.into(),
            source: Box::new(err),
        }
    }

    /// Wraps an error with the key path whose resolution failed.
    pub fn resolve(key: impl Into<String>, err: SecretfigError) -> Self {
        Self::Resolve {
            key: key.into(),
            source: Box::new(err),
        }
    }

    /// Returns the innermost error below any context wrappers.
    pub fn root(&self) -> &SecretfigError {
        match self {
            Self::BackendOperation { source, .. } | Self::Resolve { source, .. } => source.root(),
            other => other,
        }
    }

    /// True if a text-encoded binary value failed to decode.
    pub fn is_decode_error(&self) -> bool {
        matches!(self.root(), Self::Decode { .. })
    }

    /// True if the remote fetch itself failed (transport, auth, not found,
    /// or wrong payload kind).
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self.root(),
            Self::NotFound(_) | Self::MissingPayload { .. } | Self::NotInitialized | Self::Other(_)
        )
    }

    /// Key path of the leaf that failed, if this error came from a walk.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Resolve { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = SecretfigError::NotFound("test-item".to_string());
        assert_eq!(err.to_string(), "not found: test-item");

        let err = SecretfigError::MissingPayload {
            identifier: "tls-cert".to_string(),
            payload: "string",
        };
        assert_eq!(err.to_string(), "tls-cert has no string value");
    }

    #[test]
    fn test_backend_operation_error() {
        let inner = SecretfigError::NotFound("api-key".to_string());
        let err = SecretfigError::backend_op("parameterstore", "fetch_binary", "api-key", inner);

        let error_string = err.to_string();
        assert!(error_string.contains("parameterstore"));
        assert!(error_string.contains("fetch_binary"));
        assert!(error_string.contains("api-key"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_classification_through_wrappers() {
        let decode = base64::engine::general_purpose::STANDARD
            .decode("not base64!")
            .unwrap_err();
        let err = SecretfigError::resolve(
            "foo.bar",
            SecretfigError::backend_op(
                "parameterstore",
                "fetch_binary",
                "cert",
                SecretfigError::Decode {
                    identifier: "cert".to_string(),
                    source: decode,
                },
            ),
        );

        assert!(err.is_decode_error());
        assert!(!err.is_backend_error());
        assert_eq!(err.key(), Some("foo.bar"));

        let err = SecretfigError::resolve("foo", SecretfigError::NotFound("x".to_string()));
        assert!(err.is_backend_error());
        assert!(!err.is_decode_error());
    }
}
