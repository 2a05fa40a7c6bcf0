//! Environment variable source.
//!
//! Resolves references held directly in environment variables. Keys are
//! variable names; there is no nesting. Only the string markers (`sm://`,
//! `ssm://`) are interpreted, since the result has to fit back into a
//! string. Any other value, binary markers included, is returned as-is.

use crate::backend::ResolvedValue;
use crate::marker::{strip_marker, Encoding};
use crate::{Resolver, Result, SecretfigError};
use std::collections::BTreeMap;

impl Resolver {
    /// Resolves a single environment value.
    pub async fn resolve_env_value(&self, value: &str) -> Result<String> {
        match strip_marker(value) {
            Some((identifier, marker)) if marker.encoding() == Encoding::String => {
                match self.fetch(identifier, marker).await? {
                    ResolvedValue::Text(s) => Ok(s),
                    ResolvedValue::Binary(_) => Ok(value.to_string()),
                }
            }
            _ => Ok(value.to_string()),
        }
    }

    /// Reads the environment variable `key` and resolves it.
    ///
    /// An unset or non-unicode variable reads as the empty string.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run(resolver: secretfig::Resolver) -> secretfig::Result<()> {
    /// // DATABASE_PASSWORD=ssm:///prod/db/password
    /// let password = resolver.get_env("DATABASE_PASSWORD").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_env(&self, key: &str) -> Result<String> {
        let value = std::env::var(key).unwrap_or_default();
        self.resolve_env_value(&value)
            .await
            .map_err(|e| SecretfigError::resolve(key, e))
    }

    /// Resolves a set of name/value pairs, such as `std::env::vars()`.
    ///
    /// Stops at the first failure, like a tree walk.
    pub async fn resolve_env_vars<I, K, V>(&self, vars: I) -> Result<BTreeMap<String, String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut resolved = BTreeMap::new();
        for (key, value) in vars {
            let key = key.into();
            let value = self
                .resolve_env_value(value.as_ref())
                .await
                .map_err(|e| SecretfigError::resolve(key.clone(), e))?;
            resolved.insert(key, value);
        }
        Ok(resolved)
    }
}
