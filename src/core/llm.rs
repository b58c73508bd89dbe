//! OpenAI-compatible HTTP provider for generation and embeddings.

use crate::core::error::GenerationError;
use crate::core::generator::{Embedder, GenerationRequest, Generator};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};

const TIMEOUT_SECS: u64 = 60;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

// One connection pool per process, shared by every run.
static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

fn shared_client() -> Result<reqwest::Client, GenerationError> {
    if let Some(c) = SHARED_CLIENT.get() {
        return Ok(c.clone());
    }
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| GenerationError::Transport(e.to_string()))?;
    Ok(SHARED_CLIENT.get_or_init(|| client).clone())
}

/// Chat-completions and embeddings client.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, GenerationError> {
        Ok(OpenAiClient {
            client: shared_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        })
    }

    /// Reads `OPENAI_API_KEY` and optionally `CONVERGENT_BASE_URL`.
    pub fn from_env(model: &str) -> Result<Self, GenerationError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| GenerationError::Provider("OPENAI_API_KEY not found".to_string()))?;
        let base_url =
            env::var("CONVERGENT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        info!("🔌 [OpenAiClient] Using {} with model {}", base_url, model);
        Self::new(&base_url, &api_key, model)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, GenerationError> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let error = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Provider(format!(
                "{}: {}",
                status,
                error.chars().take(200).collect::<String>()
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))
    }
}

fn map_transport(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout(TIMEOUT_SECS)
    } else {
        GenerationError::Transport(e.to_string())
    }
}

#[async_trait]
impl Generator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = json!({
            "model": self.model,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user},
            ],
        });
        let response = self.post("chat/completions", &body).await?;
        let text = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| GenerationError::Decode("missing choices[0].message.content".to_string()))?;
        debug!("[OpenAiClient] Generated {} chars", text.len());
        Ok(text.to_string())
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError> {
        let body = json!({ "model": self.embedding_model, "input": text });
        let response = self.post("embeddings", &body).await?;
        let values = response["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| GenerationError::Decode("missing data[0].embedding".to_string()))?;
        Ok(values
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect())
    }
}
