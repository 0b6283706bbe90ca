use crate::error::{Result, RetrievalError};
use async_trait::async_trait;
use insight_embedding_store::Embedding;
use serde::Deserialize;
use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STUB_DIMENSION: usize = 384;

/// External service turning text into fixed-dimensionality vectors.
///
/// Query vectors and stored vectors must come from the same provider and
/// model, or selection degenerates into comparing unrelated spaces.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding>;
}

/// Which embedding backend the process uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProviderMode {
    Api,
    Stub,
}

impl ProviderMode {
    pub fn from_env() -> Result<Self> {
        let raw = env::var("INSIGHT_EMBEDDING_MODE")
            .unwrap_or_else(|_| "api".to_string())
            .to_ascii_lowercase();
        match raw.as_str() {
            "api" => Ok(Self::Api),
            "stub" => Ok(Self::Stub),
            other => Err(RetrievalError::Provider(format!(
                "Unsupported INSIGHT_EMBEDDING_MODE '{other}' (expected 'api' or 'stub')"
            ))),
        }
    }
}

/// Configuration for the OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            url: env::var("INSIGHT_EMBEDDING_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            model: env::var("INSIGHT_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_key: env::var("OPENAI_API_KEY").ok(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding provider backed by an OpenAI-compatible HTTP endpoint.
pub struct ApiProvider {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiProvider {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::Provider(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl EmbeddingProvider for ApiProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut request = self
            .http
            .post(&self.config.url)
            .json(&serde_json::json!({ "input": text, "model": self.config.model }));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrievalError::Provider(format!("Embedding request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Provider(format!(
                "Embedding endpoint returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            RetrievalError::Provider(format!("Invalid embedding response: {e}"))
        })?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                RetrievalError::Provider("Embedding response contained no data".to_string())
            })?;
        if vector.is_empty() {
            return Err(RetrievalError::Provider(
                "Embedding response contained an empty vector".to_string(),
            ));
        }

        log::debug!("Embedded {} chars into {} dims", text.len(), vector.len());
        Ok(Embedding::new(vector))
    }
}

/// Deterministic offline provider for tests and CI.
///
/// Hashes the input text into a seed and expands it into a unit vector, so
/// equal texts embed identically across runs and processes.
#[derive(Debug, Clone, Copy)]
pub struct StubProvider {
    dimension: usize,
}

impl StubProvider {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl EmbeddingProvider for StubProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(Embedding::new(hash_embed(text, self.dimension)))
    }
}

/// Build the provider selected by the process environment.
pub fn provider_from_env() -> Result<Box<dyn EmbeddingProvider>> {
    match ProviderMode::from_env()? {
        ProviderMode::Api => Ok(Box::new(ApiProvider::new(ApiConfig::from_env())?)),
        ProviderMode::Stub => Ok(Box::new(StubProvider::new(stub_dimension_from_env()))),
    }
}

fn stub_dimension_from_env() -> usize {
    env::var("INSIGHT_STUB_DIMENSION")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_STUB_DIMENSION)
        .max(1)
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vec {
        *value /= norm;
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
