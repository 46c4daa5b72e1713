use serde::{Deserialize, Serialize};
use std::fmt;

/// The demographic lookup providers the service knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Age,
    Gender,
    Nationality,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Age,
        ProviderKind::Gender,
        ProviderKind::Nationality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Age => "age",
            ProviderKind::Gender => "gender",
            ProviderKind::Nationality => "nationality",
        }
    }

    /// Decodes a response body into this provider's wire shape.
    pub fn decode(&self, body: &[u8]) -> Result<ProviderPayload, serde_json::Error> {
        Ok(match self {
            ProviderKind::Age => ProviderPayload::Age(serde_json::from_slice(body)?),
            ProviderKind::Gender => ProviderPayload::Gender(serde_json::from_slice(body)?),
            ProviderKind::Nationality => {
                ProviderPayload::Nationality(serde_json::from_slice(body)?)
            }
        })
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured provider: which schema it speaks and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub kind: ProviderKind,
    pub base_url: String,
}

impl ProviderEndpoint {
    pub fn new(kind: ProviderKind, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: base_url.into(),
        }
    }
}

// ============ Provider wire shapes ============

/// `{ "name": "...", "age": 34, "count": 1234 }`
///
/// `age` is `null` when the provider has no guess for the name.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AgeResponse {
    #[serde(default)]
    pub name: Option<String>,
    pub age: Option<f64>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// `{ "name": "...", "gender": "male", "probability": 0.98, "count": 1234 }`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenderResponse {
    #[serde(default)]
    pub name: Option<String>,
    pub gender: Option<String>,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// A single country guess from the nationality provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CountryGuess {
    pub country_id: String,
    pub probability: f64,
}

/// `{ "name": "...", "country": [ { "country_id": "UA", "probability": 0.6 }, ... ] }`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NationalityResponse {
    #[serde(default)]
    pub name: Option<String>,
    pub country: Vec<CountryGuess>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Decoded body of one provider, tagged by the schema it was decoded with.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    Age(AgeResponse),
    Gender(GenderResponse),
    Nationality(NationalityResponse),
}

// ============ Per-source outcome ============

/// Stage at which a single provider call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The request could not be built (bad base URL).
    Request(String),
    /// Connection, TLS or body read failure.
    Transport(String),
    /// The provider answered with a non-success status.
    Status(u16),
    /// The body did not match the provider's schema.
    Decode(String),
    /// The shared deadline elapsed before the provider answered.
    Timeout,
    /// The task running the call was aborted or panicked.
    Join(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Request(msg) => write!(f, "request construction failed: {}", msg),
            SourceError::Transport(msg) => write!(f, "transport failed: {}", msg),
            SourceError::Status(code) => write!(f, "provider returned status {}", code),
            SourceError::Decode(msg) => write!(f, "body decoding failed: {}", msg),
            SourceError::Timeout => write!(f, "deadline exceeded"),
            SourceError::Join(msg) => write!(f, "task failed: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

/// Result of one provider call; exactly one per dispatched provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResult {
    pub provider: ProviderKind,
    pub endpoint: String,
    pub outcome: Result<ProviderPayload, SourceError>,
}

impl SourceResult {
    pub fn success(endpoint: &ProviderEndpoint, payload: ProviderPayload) -> Self {
        Self {
            provider: endpoint.kind,
            endpoint: endpoint.base_url.clone(),
            outcome: Ok(payload),
        }
    }

    pub fn failure(endpoint: &ProviderEndpoint, error: SourceError) -> Self {
        Self {
            provider: endpoint.kind,
            endpoint: endpoint.base_url.clone(),
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}
