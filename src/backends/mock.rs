//! Mock backend for testing.
//!
//! This backend provides an in-memory implementation of [`SecretBackend`] with
//! call recording and error injection for testing code that resolves
//! configuration.

use crate::backend::decode_parameter_value;
use crate::*;
use async_trait::async_trait;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// How binary payloads are stored and returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFlavor {
    /// Native string and binary payloads, like Secrets Manager.
    Vault,
    /// Text only; binary fetches base64-decode the text, like Parameter Store.
    ParameterStore,
}

/// Operation recorded by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    String,
    Binary,
}

/// A single recorded fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub identifier: String,
    pub kind: FetchKind,
    pub decrypt: bool,
}

#[derive(Debug, Clone, Default)]
struct MockEntry {
    string: Option<String>,
    binary: Option<Vec<u8>>,
}

/// Mock backend for testing.
///
/// # Example
///
/// ```
/// use secretfig::backends::mock::MockBackend;
/// use secretfig::SecretBackend;
///
/// #[tokio::main]
/// async fn main() -> secretfig::Result<()> {
///     let backend = MockBackend::parameter_store();
///     backend.set_binary("tls/key", b"baz").await;
///
///     assert_eq!(backend.fetch_binary("tls/key", true).await?, b"baz");
///
///     let calls = backend.calls().await;
///     assert_eq!(calls.len(), 1);
///     assert!(calls[0].decrypt);
///     Ok(())
/// }
/// ```
pub struct MockBackend {
    flavor: MockFlavor,
    entries: Arc<RwLock<HashMap<String, MockEntry>>>,
    calls: Arc<RwLock<Vec<FetchCall>>>,
    failing: Arc<RwLock<HashMap<String, String>>>,

    /// Error to return from every fetch
    pub fetch_error: Option<SecretfigError>,
}

impl MockBackend {
    /// Creates a mock with the given storage flavor and empty storage.
    pub fn new(flavor: MockFlavor) -> Self {
        Self {
            flavor,
            entries: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashMap::new())),
            fetch_error: None,
        }
    }

    /// Mock behaving like Secrets Manager.
    pub fn vault() -> Self {
        Self::new(MockFlavor::Vault)
    }

    /// Mock behaving like SSM Parameter Store.
    pub fn parameter_store() -> Self {
        Self::new(MockFlavor::ParameterStore)
    }

    /// Stores a string payload.
    pub async fn set_string(&self, identifier: impl Into<String>, value: impl Into<String>) {
        let mut entries = self.entries.write().await;
        entries.entry(identifier.into()).or_default().string = Some(value.into());
    }

    /// Stores a binary payload.
    ///
    /// For the parameter store flavor the bytes are kept base64-encoded as the
    /// entry's text, which is what the real service holds.
    pub async fn set_binary(&self, identifier: impl Into<String>, value: impl AsRef<[u8]>) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(identifier.into()).or_default();
        match self.flavor {
            MockFlavor::Vault => entry.binary = Some(value.as_ref().to_vec()),
            MockFlavor::ParameterStore => {
                entry.string =
                    Some(base64::engine::general_purpose::STANDARD.encode(value.as_ref()))
            }
        }
    }

    /// Makes fetches of `identifier` fail with `message`.
    pub async fn fail_on(&self, identifier: impl Into<String>, message: impl Into<String>) {
        let mut failing = self.failing.write().await;
        failing.insert(identifier.into(), message.into());
    }

    /// Returns every fetch seen so far, in order.
    pub async fn calls(&self) -> Vec<FetchCall> {
        self.calls.read().await.clone()
    }

    async fn record(&self, identifier: &str, kind: FetchKind, decrypt: bool) -> Result<MockEntry> {
        self.calls.write().await.push(FetchCall {
            identifier: identifier.to_string(),
            kind,
            decrypt,
        });

        if let Some(ref err) = self.fetch_error {
            return Err(reproduce(err));
        }

        if let Some(message) = self.failing.read().await.get(identifier) {
            return Err(SecretfigError::Other(anyhow::anyhow!("{}", message)));
        }

        let entries = self.entries.read().await;
        entries
            .get(identifier)
            .cloned()
            .ok_or_else(|| SecretfigError::NotFound(identifier.to_string()))
    }
}

/// Rebuilds an injected error so its kind survives every call.
///
/// Kinds that carry no foreign payload are copied exactly; the rest become
/// `Other` with the same message.
fn reproduce(err: &SecretfigError) -> SecretfigError {
    match err.root() {
        SecretfigError::NotFound(id) => SecretfigError::NotFound(id.clone()),
        SecretfigError::MissingPayload { identifier, payload } => SecretfigError::MissingPayload {
            identifier: identifier.clone(),
            payload: *payload,
        },
        SecretfigError::NotInitialized => SecretfigError::NotInitialized,
        SecretfigError::Decode { identifier, source } => SecretfigError::Decode {
            identifier: identifier.clone(),
            source: source.clone(),
        },
        SecretfigError::InvalidConfig(msg) => SecretfigError::InvalidConfig(msg.clone()),
        other => SecretfigError::Other(anyhow::anyhow!("{}", other)),
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::vault()
    }
}

#[async_trait]
impl SecretBackend for MockBackend {
    fn name(&self) -> &str {
        match self.flavor {
            MockFlavor::Vault => "mock-vault",
            MockFlavor::ParameterStore => "mock-parameterstore",
        }
    }

    async fn fetch_string(&self, identifier: &str, decrypt: bool) -> Result<String> {
        let entry = self.record(identifier, FetchKind::String, decrypt).await?;
        entry.string.ok_or_else(|| SecretfigError::MissingPayload {
            identifier: identifier.to_string(),
            payload: "string",
        })
    }

    async fn fetch_binary(&self, identifier: &str, decrypt: bool) -> Result<Vec<u8>> {
        let entry = self.record(identifier, FetchKind::Binary, decrypt).await?;
        let binary = match self.flavor {
            MockFlavor::Vault => entry.binary,
            MockFlavor::ParameterStore => entry
                .string
                .map(|text| decode_parameter_value(identifier, &text))
                .transpose()?,
        };
        binary.ok_or_else(|| SecretfigError::MissingPayload {
            identifier: identifier.to_string(),
            payload: "binary",
        })
    }
}
