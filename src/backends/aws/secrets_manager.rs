//! AWS Secrets Manager backend implementation.

use crate::backends::aws::load_sdk_config;
use crate::{Config, Result, SecretBackend, SecretfigError};
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueOutput;
use aws_sdk_secretsmanager::Client;

/// AWS Secrets Manager backend.
///
/// String fetches return `SecretString`, binary fetches return
/// `SecretBinary`. The decrypt flag has no meaning here and is ignored.
pub struct SecretsManagerBackend {
    client: Option<Client>,
    config: Config,
}

impl SecretsManagerBackend {
    /// Creates an uninitialized backend; call [`init`](Self::init) before use.
    pub fn new(config: &Config) -> Self {
        Self {
            client: None,
            config: config.clone(),
        }
    }

    /// Creates a ready backend from an already loaded SDK configuration.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::with_client(Client::new(sdk_config))
    }

    /// Creates a ready backend around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: Some(client),
            config: Config::default(),
        }
    }

    /// Loads the SDK configuration and builds the client.
    pub async fn init(&mut self) -> Result<()> {
        let sdk_config = load_sdk_config(&self.config).await;
        self.client = Some(Client::new(&sdk_config));
        Ok(())
    }

    /// Drops the client.
    pub fn close(&mut self) {
        self.client = None;
    }

    async fn request_secret(&self, name: &str) -> Result<GetSecretValueOutput> {
        let client = self.client.as_ref().ok_or(SecretfigError::NotInitialized)?;

        client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception());
                if not_found {
                    SecretfigError::NotFound(name.to_string())
                } else {
                    SecretfigError::Other(anyhow::anyhow!("AWS error: {}", DisplayErrorContext(&e)))
                }
            })
    }
}

#[async_trait]
impl SecretBackend for SecretsManagerBackend {
    fn name(&self) -> &str {
        "secretsmanager"
    }

    async fn fetch_string(&self, identifier: &str, _decrypt: bool) -> Result<String> {
        let response = self
            .request_secret(identifier)
            .await
            .map_err(|e| SecretfigError::backend_op(self.name(), "fetch_string", identifier, e))?;

        response
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| {
                SecretfigError::backend_op(
                    self.name(),
                    "fetch_string",
                    identifier,
                    SecretfigError::MissingPayload {
                        identifier: identifier.to_string(),
                        payload: "string",
                    },
                )
            })
    }

    async fn fetch_binary(&self, identifier: &str, _decrypt: bool) -> Result<Vec<u8>> {
        let response = self
            .request_secret(identifier)
            .await
            .map_err(|e| SecretfigError::backend_op(self.name(), "fetch_binary", identifier, e))?;

        response
            .secret_binary()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| {
                SecretfigError::backend_op(
                    self.name(),
                    "fetch_binary",
                    identifier,
                    SecretfigError::MissingPayload {
                        identifier: identifier.to_string(),
                        payload: "binary",
                    },
                )
            })
    }
}
