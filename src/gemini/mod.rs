pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{GeneratedImage, GenerationSettings, PromptPayload},
};

pub use client::GeminiClient;

/// A hosted model that turns one prompt into one image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &PromptPayload,
        settings: &GenerationSettings,
    ) -> Result<GeneratedImage>;
}
