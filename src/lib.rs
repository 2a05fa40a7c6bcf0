//! Secretfig - resolve secret references in loaded configuration.
//!
//! Secretfig post-processes a configuration tree that has already been loaded
//! from files, environment or flags. String values that start with a
//! recognized marker are replaced in place with a value fetched from AWS
//! Secrets Manager or AWS SSM Parameter Store.
//!
//! # Markers
//!
//! | Marker | Backend | Result | Decrypt flag |
//! |--------|---------|--------|--------------|
//! | `sm://` | Secrets Manager | string | no |
//! | `smb://` | Secrets Manager | bytes | no |
//! | `ssm://` | Parameter Store | string | yes |
//! | `ssmb64://` | Parameter Store (base64 text) | bytes | yes |
//!
//! # Quick Start
//!
//! ```
//! use secretfig::backends::mock::MockBackend;
//! use secretfig::{ConfigTree, ConfigValue, Resolver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> secretfig::Result<()> {
//!     let vault = Arc::new(MockBackend::vault());
//!     let params = Arc::new(MockBackend::parameter_store());
//!     vault.set_string("prod/db-password", "hunter2").await;
//!     params.set_binary("/prod/tls/key", b"baz").await;
//!
//!     let mut config = ConfigTree::from_json_str(
//!         r#"{"db": {"password": "sm://prod/db-password", "host": "db.internal"},
//!             "tls": {"key": "ssmb64:///prod/tls/key"}}"#,
//!     )?;
//!
//!     Resolver::new(vault, params).resolve(&mut config).await?;
//!
//!     assert_eq!(config.get("db.password"), Some(&ConfigValue::String("hunter2".into())));
//!     assert_eq!(config.get("tls.key"), Some(&ConfigValue::Bytes(b"baz".to_vec())));
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Provides |
//! |---------|---------|----------|
//! | `mock` | yes | In-memory [`backends::mock::MockBackend`] |
//! | `aws` | no | SDK backends and [`bootstrap`] |
//!
//! ```toml
//! [dependencies]
//! secretfig = { version = "0.1", features = ["aws"] }
//! ```

pub mod backend;
pub mod backends;
pub mod config;
pub mod env;
pub mod error;
pub mod marker;
pub mod resolver;
pub mod value;

#[cfg(feature = "aws")]
pub mod bootstrap;

pub use backend::{ResolvedValue, SecretBackend};
pub use config::Config;
pub use error::{Result, SecretfigError};
pub use marker::{BackendKind, Encoding, Marker};
pub use resolver::{ResolveReport, ResolvedKey, Resolver};
pub use value::{ConfigTree, ConfigValue, Settings};
