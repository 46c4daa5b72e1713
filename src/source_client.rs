use crate::errors::AppError;
use crate::provider_models::{ProviderEndpoint, SourceError, SourceResult};
use std::time::Duration;

/// HTTP client for the demographic lookup providers.
///
/// Every call resolves to a [`SourceResult`]; failures are reported in the
/// result rather than returned as errors, so callers always get exactly one
/// result per dispatched call.
#[derive(Clone)]
pub struct SourceClient {
    client: reqwest::Client,
}

impl SourceClient {
    /// Creates a new `SourceClient`.
    ///
    /// The per-request timeout is a safety net only; callers bound the whole
    /// fan-out with a shared deadline.
    pub fn new() -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create provider client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Builds `<base_url>?name=<name>` with the name properly encoded.
    pub fn lookup_url(base_url: &str, name: &str) -> Result<reqwest::Url, SourceError> {
        reqwest::Url::parse_with_params(base_url, &[("name", name)])
            .map_err(|e| SourceError::Request(format!("invalid base URL {}: {}", base_url, e)))
    }

    /// Performs one GET against `endpoint` for `name` and decodes the body
    /// with the endpoint's schema.
    pub async fn fetch(&self, endpoint: &ProviderEndpoint, name: &str) -> SourceResult {
        match self.try_fetch(endpoint, name).await {
            Ok(result) => result,
            Err(error) => {
                tracing::warn!(
                    provider = %endpoint.kind,
                    endpoint = %endpoint.base_url,
                    error = %error,
                    "Provider lookup failed"
                );
                SourceResult::failure(endpoint, error)
            }
        }
    }

    async fn try_fetch(
        &self,
        endpoint: &ProviderEndpoint,
        name: &str,
    ) -> Result<SourceResult, SourceError> {
        let url = Self::lookup_url(&endpoint.base_url, name)?;
        tracing::debug!("Querying {} provider: {}", endpoint.kind, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Transport(format!("failed to read body: {}", e)))?;

        let payload = endpoint
            .kind
            .decode(&body)
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        tracing::debug!("{} provider answered for {}", endpoint.kind, name);
        Ok(SourceResult::success(endpoint, payload))
    }
}
