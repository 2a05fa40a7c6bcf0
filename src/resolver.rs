//! The resolution engine.
//!
//! [`Resolver`] walks a loaded configuration depth-first, finds string leaves
//! carrying a marker, fetches each one from its backend and writes the result
//! back at the same key path. Fetches run one at a time in traversal order.
//! The first failure stops the walk; leaves resolved before it keep their
//! new values.

use crate::backend::{ResolvedValue, SecretBackend};
use crate::marker::{strip_marker, BackendKind, Encoding, Marker};
use crate::value::KEY_PATH_SEPARATOR;
use crate::{Config, ConfigValue, Result, SecretfigError, Settings};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A key path rewritten by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    pub marker: Marker,
}

/// Outcome of a successful walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Resolved leaves in traversal order
    pub resolved: Vec<ResolvedKey>,
}

impl ResolveReport {
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Key paths of the resolved leaves.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.resolved.iter().map(|r| r.key.as_str())
    }
}

/// Resolves marked configuration values through injected backends.
///
/// # Example
///
/// ```
/// use secretfig::backends::mock::MockBackend;
/// use secretfig::{ConfigTree, ConfigValue, Resolver};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> secretfig::Result<()> {
///     let vault = Arc::new(MockBackend::vault());
///     vault.set_string("secret1", "resolved").await;
///
///     let resolver = Resolver::new(vault, Arc::new(MockBackend::parameter_store()));
///
///     let mut tree = ConfigTree::from_json_str(r#"{"foo": {"bar": {"baz": "sm://secret1"}}}"#)?;
///     resolver.resolve(&mut tree).await?;
///
///     assert_eq!(tree.get("foo.bar.baz"), Some(&ConfigValue::String("resolved".into())));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Resolver {
    secrets_manager: Arc<dyn SecretBackend>,
    parameter_store: Arc<dyn SecretBackend>,
    decrypt_parameter_store_values: bool,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("secrets_manager", &self.secrets_manager.name())
            .field("parameter_store", &self.parameter_store.name())
            .field("decrypt_parameter_store_values", &self.decrypt_parameter_store_values)
            .finish()
    }
}

impl Resolver {
    /// Creates a resolver that requests decryption of parameter store values.
    pub fn new(
        secrets_manager: Arc<dyn SecretBackend>,
        parameter_store: Arc<dyn SecretBackend>,
    ) -> Self {
        Self {
            secrets_manager,
            parameter_store,
            decrypt_parameter_store_values: true,
        }
    }

    /// Creates a resolver taking its settings from `config`.
    pub fn with_config(
        secrets_manager: Arc<dyn SecretBackend>,
        parameter_store: Arc<dyn SecretBackend>,
        config: &Config,
    ) -> Self {
        Self::new(secrets_manager, parameter_store).with_decrypt(config.decrypt_parameter_store_values)
    }

    /// Sets the decrypt flag sent with every parameter store fetch.
    pub fn with_decrypt(mut self, decrypt: bool) -> Self {
        self.decrypt_parameter_store_values = decrypt;
        self
    }

    pub fn decrypt_parameter_store_values(&self) -> bool {
        self.decrypt_parameter_store_values
    }

    fn backend(&self, kind: BackendKind) -> &dyn SecretBackend {
        match kind {
            BackendKind::SecretsManager => self.secrets_manager.as_ref(),
            BackendKind::ParameterStore => self.parameter_store.as_ref(),
        }
    }

    /// Fetches `identifier` as selected by `marker`.
    pub async fn fetch(&self, identifier: &str, marker: Marker) -> Result<ResolvedValue> {
        let backend = self.backend(marker.backend());
        let decrypt = marker.decrypt_applicable() && self.decrypt_parameter_store_values;

        match marker.encoding() {
            Encoding::String => backend.fetch_string(identifier, decrypt).await.map(ResolvedValue::Text),
            Encoding::Binary => backend.fetch_binary(identifier, decrypt).await.map(ResolvedValue::Binary),
        }
    }

    /// Resolves a single value.
    ///
    /// Returns `Ok(None)` when the value carries no marker.
    pub async fn resolve_value(&self, value: &str) -> Result<Option<ResolvedValue>> {
        match strip_marker(value) {
            Some((identifier, marker)) => self.fetch(identifier, marker).await.map(Some),
            None => Ok(None),
        }
    }

    /// Resolves every marked string leaf in `settings`, in place.
    ///
    /// Sibling keys are visited in sorted order, parents before children.
    /// Each resolved value is written before the next fetch starts, so on
    /// error the leaves before the failing one stay resolved.
    ///
    /// # Errors
    ///
    /// Returns the first fetch failure wrapped in [`SecretfigError::Resolve`]
    /// with the key path of the failing leaf.
    pub async fn resolve<S: Settings + ?Sized>(&self, settings: &mut S) -> Result<ResolveReport> {
        let mut references = Vec::new();
        collect_references(&mut Vec::new(), &settings.all_settings(), &mut references);

        let mut report = ResolveReport::default();
        for reference in references {
            let key = reference.key();
            let value = reference.value;
            // collect_references only keeps marked strings
            let Some((identifier, marker)) = strip_marker(&value) else {
                continue;
            };

            let resolved = match self.fetch(identifier, marker).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::error!(key = %key, marker = %marker, error = %e, "failed to resolve configuration value");
                    return Err(SecretfigError::resolve(key, e));
                }
            };

            tracing::debug!(
                key = %key,
                marker = %marker,
                backend = self.backend(marker.backend()).name(),
                bytes = resolved.len(),
                "resolved configuration value"
            );

            let path: Vec<&str> = reference.path.iter().map(String::as_str).collect();
            settings.set_path(&path, ConfigValue::from(resolved));
            report.resolved.push(ResolvedKey { key, marker });
        }

        tracing::info!(resolved = report.len(), "configuration references resolved");
        Ok(report)
    }

    /// Runs [`resolve`](Self::resolve) to completion on a private
    /// current-thread runtime.
    ///
    /// For synchronous startup code. Panics if called from within an async
    /// runtime.
    pub fn resolve_blocking<S: Settings + ?Sized>(&self, settings: &mut S) -> Result<ResolveReport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.resolve(settings))
    }
}

/// A marked string leaf found by the walk.
struct Reference {
    /// Keys from the root; a key may itself contain the separator
    path: Vec<String>,
    value: String,
}

impl Reference {
    /// Dotted key path, for logs and reports.
    fn key(&self) -> String {
        self.path.join(KEY_PATH_SEPARATOR)
    }
}

fn collect_references(
    path: &mut Vec<String>,
    table: &BTreeMap<String, ConfigValue>,
    out: &mut Vec<Reference>,
) {
    for (name, value) in table {
        path.push(name.clone());

        match value {
            ConfigValue::Table(child) => collect_references(path, child, out),
            ConfigValue::String(s) if strip_marker(s).is_some() => out.push(Reference {
                path: path.clone(),
                value: s.clone(),
            }),
            _ => {}
        }

        path.pop();
    }
}
