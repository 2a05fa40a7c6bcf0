//! AWS SSM Parameter Store backend implementation.

use crate::backend::decode_parameter_value;
use crate::backends::aws::load_sdk_config;
use crate::{Config, Result, SecretBackend, SecretfigError};
use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::Client;

/// AWS SSM Parameter Store backend.
///
/// Parameters are always text. Binary fetches expect the text to be standard
/// base64 and decode it. `decrypt` maps to `WithDecryption` on every request.
pub struct ParameterStoreBackend {
    client: Option<Client>,
    config: Config,
}

impl ParameterStoreBackend {
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

    async fn request_parameter(&self, name: &str, decrypt: bool) -> Result<String> {
        let client = self.client.as_ref().ok_or(SecretfigError::NotInitialized)?;

        let response = client
            .get_parameter()
            .name(name)
            .with_decryption(decrypt)
            .send()
            .await
            .map_err(|e| {
                let not_found = e.as_service_error().is_some_and(|se| se.is_parameter_not_found());
                if not_found {
                    SecretfigError::NotFound(name.to_string())
                } else {
                    SecretfigError::Other(anyhow::anyhow!("AWS error: {}", DisplayErrorContext(&e)))
                }
            })?;

        response
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| SecretfigError::MissingPayload {
                identifier: name.to_string(),
                payload: "string",
            })
    }
}

#[async_trait]
impl SecretBackend for ParameterStoreBackend {
    fn name(&self) -> &str {
        "parameterstore"
    }

    async fn fetch_string(&self, identifier: &str, decrypt: bool) -> Result<String> {
        self.request_parameter(identifier, decrypt)
            .await
            .map_err(|e| SecretfigError::backend_op(self.name(), "fetch_string", identifier, e))
    }

    async fn fetch_binary(&self, identifier: &str, decrypt: bool) -> Result<Vec<u8>> {
        self.request_parameter(identifier, decrypt)
            .await
            .and_then(|text| decode_parameter_value(identifier, &text))
            .map_err(|e| SecretfigError::backend_op(self.name(), "fetch_binary", identifier, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_before_init() {
        let backend = ParameterStoreBackend::new(&Config::new());

        let err = backend.fetch_binary("/app/cert", true).await.unwrap_err();
        assert!(matches!(err.root(), SecretfigError::NotInitialized));
        assert!(err.is_backend_error());
    }
}
