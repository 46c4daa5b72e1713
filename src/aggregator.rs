use crate::provider_models::{ProviderEndpoint, SourceError, SourceResult};
use crate::source_client::SourceClient;
use std::time::Duration;
use tokio::time::Instant;

/// Fans one name out to every configured provider and waits for all of them.
///
/// All calls share one deadline. A provider still running when the deadline
/// elapses is cancelled and reported as [`SourceError::Timeout`], so the
/// result always holds exactly one entry per provider.
#[derive(Clone)]
pub struct Aggregator {
    client: SourceClient,
    providers: Vec<ProviderEndpoint>,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(client: SourceClient, providers: Vec<ProviderEndpoint>, timeout: Duration) -> Self {
        Self {
            client,
            providers,
            timeout,
        }
    }

    pub fn providers(&self) -> &[ProviderEndpoint] {
        &self.providers
    }

    /// Queries every provider concurrently for `name`.
    ///
    /// Result order follows the provider list, but consumers should key on
    /// [`SourceResult::provider`] rather than position.
    pub async fn aggregate(&self, name: &str) -> Vec<SourceResult> {
        let deadline = Instant::now() + self.timeout;

        let handles: Vec<_> = self
            .providers
            .iter()
            .map(|endpoint| {
                let client = self.client.clone();
                let task_endpoint = endpoint.clone();
                let name = name.to_string();
                let handle = tokio::spawn(async move {
                    match tokio::time::timeout_at(deadline, client.fetch(&task_endpoint, &name))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => {
                            tracing::warn!(
                                provider = %task_endpoint.kind,
                                endpoint = %task_endpoint.base_url,
                                "Provider did not answer before the deadline"
                            );
                            SourceResult::failure(&task_endpoint, SourceError::Timeout)
                        }
                    }
                });
                (endpoint, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (endpoint, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(provider = %endpoint.kind, "Provider task failed: {}", e);
                    SourceResult::failure(endpoint, SourceError::Join(e.to_string()))
                }
            };
            results.push(result);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::debug!(
            "Aggregated {} provider result(s) for {} ({} failed)",
            results.len(),
            name,
            failed
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider_models::ProviderKind;

    #[tokio::test]
    async fn test_no_providers_yields_no_results() {
        let aggregator = Aggregator::new(
            SourceClient::new().unwrap(),
            Vec::new(),
            Duration::from_secs(1),
        );
        assert!(aggregator.aggregate("Aleksei").await.is_empty());
    }

    #[tokio::test]
    async fn test_bad_endpoints_still_yield_one_result_each() {
        let providers = vec![
            ProviderEndpoint::new(ProviderKind::Age, "not a url"),
            ProviderEndpoint::new(ProviderKind::Gender, "also not a url"),
        ];
        let aggregator = Aggregator::new(
            SourceClient::new().unwrap(),
            providers,
            Duration::from_secs(1),
        );

        let results = aggregator.aggregate("Aleksei").await;
        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, Err(SourceError::Request(_)))));
    }
}
