/// Demographic enrichment of a person's first name.
///
/// The workflow is:
/// 1. Fan the name out to the age, gender and nationality providers
/// 2. Merge whatever came back into one `EnrichmentResult`
/// 3. Report unusable providers without failing the caller
///
/// Each field degrades on its own: a broken provider only leaves its own
/// field empty.
use crate::aggregator::Aggregator;
use crate::provider_models::{
    AgeResponse, CountryGuess, GenderResponse, NationalityResponse, ProviderKind,
    ProviderPayload, SourceResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Consolidated demographic guesses for one name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnrichmentResult {
    pub age: Option<i32>,
    pub gender: Option<String>,
    /// Reported by the gender provider, informational only.
    pub gender_probability: Option<f64>,
    pub nationality: Option<String>,
    pub nationality_probability: Option<f64>,
}

impl EnrichmentResult {
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.gender.is_none() && self.nationality.is_none()
    }
}

/// A provider whose answer could not be used in this merge.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: ProviderKind,
    pub reason: String,
}

impl ProviderFailure {
    fn new(provider: ProviderKind, reason: impl Into<String>) -> Self {
        Self {
            provider,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

/// Picks the guess with the highest probability.
///
/// Ties keep the entry seen first. Entries with a non-finite probability
/// are ignored.
pub fn best_country_guess(guesses: &[CountryGuess]) -> Option<&CountryGuess> {
    let mut best: Option<&CountryGuess> = None;
    for guess in guesses.iter().filter(|g| g.probability.is_finite()) {
        match best {
            Some(current) if guess.probability <= current.probability => {}
            _ => best = Some(guess),
        }
    }
    best
}

fn age_from(resp: &AgeResponse) -> Result<i32, String> {
    let age = resp.age.ok_or("no age guess for this name")?;
    if !age.is_finite() || age < 0.0 || age > i32::MAX as f64 {
        return Err(format!("age out of range: {}", age));
    }
    Ok(age.trunc() as i32)
}

fn gender_from(resp: &GenderResponse) -> Result<(String, Option<f64>), String> {
    match resp.gender.as_deref().map(str::trim) {
        Some(gender) if !gender.is_empty() => Ok((gender.to_string(), resp.probability)),
        _ => Err("no gender guess for this name".to_string()),
    }
}

fn nationality_from(resp: &NationalityResponse) -> Result<(String, f64), String> {
    best_country_guess(&resp.country)
        .map(|guess| (guess.country_id.clone(), guess.probability))
        .ok_or_else(|| "no country guesses for this name".to_string())
}

/// Merges the per-provider results into one best-effort `EnrichmentResult`.
///
/// Returns the merged value together with the providers that could not be
/// used. The merge itself never fails. When a provider kind appears more
/// than once, the first usable answer wins.
pub fn merge(results: &[SourceResult]) -> (EnrichmentResult, Vec<ProviderFailure>) {
    let mut merged = EnrichmentResult::default();
    let mut failures = Vec::new();

    for result in results {
        let payload = match &result.outcome {
            Ok(payload) => payload,
            Err(e) => {
                failures.push(ProviderFailure::new(result.provider, e.to_string()));
                continue;
            }
        };

        match payload {
            ProviderPayload::Age(resp) => match age_from(resp) {
                Ok(age) => {
                    merged.age.get_or_insert(age);
                }
                Err(reason) => failures.push(ProviderFailure::new(ProviderKind::Age, reason)),
            },
            ProviderPayload::Gender(resp) => match gender_from(resp) {
                Ok((gender, probability)) => {
                    if merged.gender.is_none() {
                        merged.gender = Some(gender);
                        merged.gender_probability = probability;
                    }
                }
                Err(reason) => failures.push(ProviderFailure::new(ProviderKind::Gender, reason)),
            },
            ProviderPayload::Nationality(resp) => match nationality_from(resp) {
                Ok((country, probability)) => {
                    if merged.nationality.is_none() {
                        merged.nationality = Some(country);
                        merged.nationality_probability = Some(probability);
                    }
                }
                Err(reason) => {
                    failures.push(ProviderFailure::new(ProviderKind::Nationality, reason))
                }
            },
        }
    }

    (merged, failures)
}

/// Runs the full enrichment for `name`: fan-out, merge, report.
///
/// Provider failures are logged and otherwise swallowed.
pub async fn enrich_name(aggregator: &Aggregator, name: &str) -> EnrichmentResult {
    tracing::info!("Enriching name: {}", name);

    let results = aggregator.aggregate(name).await;
    let (enrichment, failures) = merge(&results);

    for failure in &failures {
        tracing::warn!(
            provider = %failure.provider,
            reason = %failure.reason,
            "Enrichment degraded for {}",
            name
        );
    }

    tracing::info!(
        "Enrichment for {}: age={:?} gender={:?} nationality={:?} ({} provider(s) unusable)",
        name,
        enrichment.age,
        enrichment.gender,
        enrichment.nationality,
        failures.len()
    );

    enrichment
}
