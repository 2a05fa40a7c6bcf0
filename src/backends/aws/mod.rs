//! AWS backends: Secrets Manager and SSM Parameter Store.
//!
//! Both adapters use the official AWS SDK and share one credential chain.
//!
//! # Requirements
//!
//! - AWS credentials configured via:
//!   - Environment variables (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`)
//!   - Shared credentials file (`~/.aws/credentials`)
//!   - IAM instance role (for EC2/ECS)
//!
//! # Example
//!
//! ```no_run
//! use secretfig::backends::aws::{ParameterStoreBackend, SecretsManagerBackend};
//! use secretfig::{Config, SecretBackend};
//!
//! #[tokio::main]
//! async fn main() -> secretfig::Result<()> {
//!     let config = Config::new().with_region("us-west-2");
//!
//!     let mut vault = SecretsManagerBackend::new(&config);
//!     vault.init().await?;
//!
//!     let password = vault.fetch_string("prod/db-password", false).await?;
//!     println!("{} bytes", password.len());
//!
//!     let mut params = ParameterStoreBackend::new(&config);
//!     params.init().await?;
//!     let cert = params.fetch_binary("/prod/tls/cert", true).await?;
//!     println!("{} bytes", cert.len());
//!
//!     Ok(())
//! }
//! ```

mod parameter_store;
mod secrets_manager;

pub use parameter_store::ParameterStoreBackend;
pub use secrets_manager::SecretsManagerBackend;

use crate::Config;

/// Loads the SDK configuration, applying region, endpoint and profile
/// overrides from `config`.
pub async fn load_sdk_config(config: &Config) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

    if let Some(ref region) = config.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }

    // Use custom endpoint if provided (for LocalStack testing)
    if let Some(ref endpoint) = config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    if let Some(profile) = config.get_option("profile") {
        loader = loader.profile_name(profile);
    }

    loader.load().await
}
