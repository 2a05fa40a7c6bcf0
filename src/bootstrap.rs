//! One-shot startup resolution against AWS.
//!
//! Builds both AWS backends from a single SDK configuration and runs one walk.
//! The error is returned rather than panicking; startup code decides whether
//! an unresolved secret aborts the process (it usually should).

use crate::backends::aws::{load_sdk_config, ParameterStoreBackend, SecretsManagerBackend};
use crate::{Config, ResolveReport, Resolver, Result, Settings};
use std::sync::Arc;

/// Builds a resolver backed by AWS Secrets Manager and SSM Parameter Store.
pub async fn aws_resolver(config: &Config) -> Resolver {
    let sdk_config = load_sdk_config(config).await;

    Resolver::with_config(
        Arc::new(SecretsManagerBackend::from_sdk_config(&sdk_config)),
        Arc::new(ParameterStoreBackend::from_sdk_config(&sdk_config)),
        config,
    )
}

/// Resolves every reference in `settings` using AWS backends.
///
/// # Example
///
/// ```no_run
/// use secretfig::{bootstrap, Config, ConfigTree};
///
/// #[tokio::main]
/// async fn main() {
///     let mut settings = ConfigTree::from_json_str(r#"{"db": {"password": "sm://prod/db"}}"#)
///         .expect("valid json");
///
///     if let Err(e) = bootstrap::resolve(&mut settings, &Config::default()).await {
///         eprintln!("unable to resolve configuration: {}", e);
///         std::process::exit(1);
///     }
/// }
/// ```
pub async fn resolve<S: Settings + ?Sized>(settings: &mut S, config: &Config) -> Result<ResolveReport> {
    let resolver = aws_resolver(config).await;
    tracing::debug!(?resolver, region = ?config.region, "resolving configuration references");
    resolver.resolve(settings).await
}
