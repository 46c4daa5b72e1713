use crate::provider_models::{ProviderEndpoint, ProviderKind};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_AGE_API_URL: &str = "https://api.agify.io/";
const DEFAULT_GENDER_API_URL: &str = "https://api.genderize.io/";
const DEFAULT_NATIONALITY_API_URL: &str = "https://api.nationalize.io/";
const DEFAULT_ENRICHMENT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub age_api_url: String,
    pub gender_api_url: String,
    pub nationality_api_url: String,
    pub enrichment_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var("ENV_PATH") {
            Ok(path) if !path.trim().is_empty() => {
                dotenvy::from_path(&path)
                    .map_err(|e| anyhow::anyhow!("failed to load env file at {}: {}", path, e))?;
            }
            _ => {
                dotenvy::dotenv().ok();
            }
        }

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("DB_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DATABASE_URL or DB_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .or_else(|_| std::env::var("API_PORT"))
                .map(|p| p.trim_start_matches(':').to_string())
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            age_api_url: provider_url("AGE_API_URL", DEFAULT_AGE_API_URL)?,
            gender_api_url: provider_url("GENDER_API_URL", DEFAULT_GENDER_API_URL)?,
            nationality_api_url: provider_url("NATIONALITY_API_URL", DEFAULT_NATIONALITY_API_URL)?,
            enrichment_timeout_secs: match std::env::var("ENRICHMENT_TIMEOUT_SECS") {
                Ok(raw) => match raw.trim().parse::<u64>() {
                    Ok(secs) if secs > 0 => secs,
                    _ => anyhow::bail!("ENRICHMENT_TIMEOUT_SECS must be a positive integer"),
                },
                Err(_) => DEFAULT_ENRICHMENT_TIMEOUT_SECS,
            },
        };

        // Log configuration summary (database credentials are truncated)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            truncated_database_url(&config.database_url)
        );
        tracing::debug!("Age provider: {}", config.age_api_url);
        tracing::debug!("Gender provider: {}", config.gender_api_url);
        tracing::debug!("Nationality provider: {}", config.nationality_api_url);
        tracing::debug!("Enrichment timeout: {}s", config.enrichment_timeout_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Provider endpoints handed to the aggregator, one per provider kind.
    pub fn providers(&self) -> Vec<ProviderEndpoint> {
        vec![
            ProviderEndpoint::new(ProviderKind::Nationality, &self.nationality_api_url),
            ProviderEndpoint::new(ProviderKind::Gender, &self.gender_api_url),
            ProviderEndpoint::new(ProviderKind::Age, &self.age_api_url),
        ]
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_secs)
    }
}

fn provider_url(var: &str, default: &str) -> anyhow::Result<String> {
    let raw = std::env::var(var)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());

    let parsed = url::Url::parse(&raw)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL ({}): {}", var, raw, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", var);
    }

    Ok(raw)
}

/// First 20 characters of the database URL, for logging.
fn truncated_database_url(url: &str) -> String {
    url.chars().take(20).collect()
}
