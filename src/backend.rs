//! Backend trait definition for secret sources.
//!
//! This module defines the [`SecretBackend`] capability that the resolver
//! dispatches to. Two operations cover every marker: fetch a string, or fetch
//! bytes. Implementations perform exactly one outbound request per call and
//! never retry or cache.

use crate::{ConfigValue, Result, SecretfigError};
use async_trait::async_trait;
use base64::Engine;

/// A source of secret values.
///
/// All implementations must be `Send + Sync` so a resolver can hold them
/// behind `Arc<dyn SecretBackend>`.
///
/// # Implementations
///
/// - **SDK-based**: AWS Secrets Manager, AWS SSM Parameter Store (`aws` feature)
/// - **Testing**: Mock backend with call recording and error injection
#[async_trait]
pub trait SecretBackend: Send + Sync {
    /// Returns the backend name (e.g., "secretsmanager", "parameterstore").
    fn name(&self) -> &str;

    /// Fetches the string payload stored under `identifier`.
    ///
    /// `decrypt` asks the backend to decrypt encrypted-at-rest values. Backends
    /// without that notion ignore it.
    ///
    /// # Errors
    ///
    /// - [`SecretfigError::NotFound`]: identifier does not exist
    /// - [`SecretfigError::MissingPayload`]: entry holds no string payload
    async fn fetch_string(&self, identifier: &str, decrypt: bool) -> Result<String>;

    /// Fetches the binary payload stored under `identifier`.
    ///
    /// Backends that only store text hold binary values base64-encoded and
    /// decode them here with [`decode_parameter_value`].
    ///
    /// # Errors
    ///
    /// - [`SecretfigError::NotFound`]: identifier does not exist
    /// - [`SecretfigError::MissingPayload`]: entry holds no binary payload
    /// - [`SecretfigError::Decode`]: text payload is not valid base64
    async fn fetch_binary(&self, identifier: &str, decrypt: bool) -> Result<Vec<u8>>;
}

/// A value returned by a backend, ready to be written into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    Text(String),
    Binary(Vec<u8>),
}

impl ResolvedValue {
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ResolvedValue> for ConfigValue {
    fn from(value: ResolvedValue) -> Self {
        match value {
            ResolvedValue::Text(s) => ConfigValue::String(s),
            ResolvedValue::Binary(b) => ConfigValue::Bytes(b),
        }
    }
}

/// Decodes a text-encoded binary parameter (standard base64 alphabet, padded).
///
/// # Example
///
/// ```
/// use secretfig::backend::decode_parameter_value;
///
/// assert_eq!(decode_parameter_value("cert", "YmF6").unwrap(), b"baz");
/// assert!(decode_parameter_value("cert", "not base64!").unwrap_err().is_decode_error());
/// ```
pub fn decode_parameter_value(identifier: &str, text: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(text)
        .map_err(|source| SecretfigError::Decode {
            identifier: identifier.to_string(),
            source,
        })
}
