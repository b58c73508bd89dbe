//! Collaborator seams for text generation and embeddings.
//!
//! The engine only ever sees these traits; concrete providers live in
//! [`crate::core::llm`] or in the caller's code.

use crate::core::error::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One generation call: system prompt, user prompt and sampling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError>;
}

/// Adapts a plain synchronous function into a [`Generator`].
pub struct FnGenerator<F>(pub F);

#[async_trait]
impl<F> Generator for FnGenerator<F>
where
    F: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync,
{
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (self.0)(request)
    }
}

/// Adapts a plain synchronous function into an [`Embedder`].
pub struct FnEmbedder<F>(pub F);

#[async_trait]
impl<F> Embedder for FnEmbedder<F>
where
    F: Fn(&str) -> Result<Vec<f32>, GenerationError> + Send + Sync,
{
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError> {
        (self.0)(text)
    }
}
