use std::sync::Arc;

use futures::future::{AbortRegistration, Abortable};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::{
    config::{Config, GeminiConfig},
    credentials::{mask_key, CredentialProvider, EnvFallback, FileCredentialStore, InMemoryCredentials},
    error::{Result, ThumbnailError},
    gemini::{GeminiClient, ImageGenerator},
    logger,
    models::{
        AspectRatio, GenerationRequest, GenerationResult, GenerationSettings, ImageOrigin,
        PromptPayload, ResponseModality, TextOrigin,
    },
    prompt::build_prompt,
};

/// Number of thumbnail variants produced per submission.
pub const VARIANT_COUNT: usize = 3;

/// Builds prompts and fans each submission out to three concurrent generations.
#[derive(Clone)]
pub struct ThumbnailGenerator {
    generator: Arc<dyn ImageGenerator>,
    credentials: Arc<dyn CredentialProvider>,
    model_id: String,
    response_modalities: Vec<ResponseModality>,
    admission: Option<Arc<Semaphore>>,
}

impl ThumbnailGenerator {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        credentials: Arc<dyn CredentialProvider>,
        config: &GeminiConfig,
    ) -> Self {
        Self {
            generator,
            credentials,
            model_id: config.model_id.clone(),
            response_modalities: config.response_modalities.clone(),
            admission: None,
        }
    }

    /// Wires the Gemini client and the credential chain described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let store: Arc<dyn CredentialProvider> = match &config.key_file {
            Some(path) => Arc::new(FileCredentialStore::new(path.clone())),
            None => Arc::new(InMemoryCredentials::new()),
        };
        let credentials = Arc::new(EnvFallback::new(store, config.fallback_api_key.clone()));
        let generator = Arc::new(GeminiClient::new(&config.gemini));

        let mut thumbnails = Self::new(generator, credentials, &config.gemini);
        if let Some(limit) = config.max_in_flight {
            thumbnails = thumbnails.with_max_in_flight(limit);
        }
        thumbnails
    }

    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.admission = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub async fn generate_from_text(
        &self,
        prompt_text: &str,
        overlay_text: Option<&str>,
        aspect_ratio: AspectRatio,
        api_key: Option<&str>,
    ) -> Result<GenerationResult> {
        let request = GenerationRequest::Text(TextOrigin {
            prompt_text: prompt_text.to_string(),
            overlay_text: overlay_text.map(String::from),
            aspect_ratio,
            api_key: api_key.map(String::from),
        });
        self.generate(&request).await
    }

    pub async fn generate_from_image(
        &self,
        reference_image: &str,
        description: &str,
        overlay_text: Option<&str>,
        aspect_ratio: AspectRatio,
        api_key: Option<&str>,
    ) -> Result<GenerationResult> {
        let request = GenerationRequest::Image(ImageOrigin {
            reference_image: reference_image.to_string(),
            description: description.to_string(),
            overlay_text: overlay_text.map(String::from),
            aspect_ratio,
            api_key: api_key.map(String::from),
        });
        self.generate(&request).await
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let _permit = match &self.admission {
            Some(semaphore) => Some(semaphore.acquire().await.map_err(|_| {
                ThumbnailError::ConfigError("Admission limiter is closed".into())
            })?),
            None => None,
        };

        let request_id = Uuid::new_v4().to_string();
        let _timer = logger::timer(&format!("thumbnails[{}]", request_id));

        let prompt = build_prompt(request);
        let api_key = self.resolve_api_key(request).await;
        let settings = GenerationSettings {
            model_id: self.model_id.clone(),
            response_modalities: self.response_modalities.clone(),
            api_key,
        };

        log::info!(
            "🎨 Generating {} thumbnails from {} [req:{}] ratio={} overlay={} key={}",
            VARIANT_COUNT,
            request.origin_name(),
            request_id,
            request.aspect_ratio().phrase(),
            request.overlay_text().is_some(),
            settings
                .api_key
                .as_deref()
                .map(mask_key)
                .unwrap_or_else(|| "none".to_string()),
        );
        log::debug!("Prompt payload: {}", describe_prompt(&prompt));

        match self.dispatch(&prompt, &settings).await {
            Ok(result) => {
                log::info!("✅ Generated {} thumbnails [req:{}]", VARIANT_COUNT, request_id);
                Ok(result)
            }
            Err(e) => {
                log::error!("❌ Thumbnail generation failed [req:{}]: {}", request_id, e);
                Err(e)
            }
        }
    }

    /// Like [`generate`](Self::generate), but aborts all in-flight calls when the
    /// paired `AbortHandle` fires.
    pub async fn generate_cancellable(
        &self,
        request: &GenerationRequest,
        registration: AbortRegistration,
    ) -> Result<GenerationResult> {
        match Abortable::new(self.generate(request), registration).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("⚠️  Thumbnail generation cancelled");
                Err(ThumbnailError::Cancelled)
            }
        }
    }

    /// Request key first, then the stored or process-wide key.
    async fn resolve_api_key(&self, request: &GenerationRequest) -> Option<String> {
        match request.api_key() {
            Some(key) => Some(key.to_string()),
            None => self.credentials.get().await,
        }
    }

    async fn dispatch(
        &self,
        prompt: &PromptPayload,
        settings: &GenerationSettings,
    ) -> Result<GenerationResult> {
        // try_join polls all three together and returns on the first error,
        // dropping the calls still in flight.
        let (first, second, third) = futures::try_join!(
            self.generator.generate(prompt, settings),
            self.generator.generate(prompt, settings),
            self.generator.generate(prompt, settings),
        )?;

        for (index, image) in [&first, &second, &third].iter().enumerate() {
            if let Some(text) = &image.text {
                log::debug!("Model note for thumbnail {}: {}", index + 1, text);
            }
        }

        Ok(GenerationResult::from_array([
            first.data_uri,
            second.data_uri,
            third.data_uri,
        ]))
    }
}

fn describe_prompt(prompt: &PromptPayload) -> String {
    let media = prompt
        .media()
        .map(|uri| format!("{} bytes of reference image", uri.len()))
        .unwrap_or_else(|| "no reference image".to_string());
    format!(
        "{} segments, {} chars of instructions, {}",
        prompt.segments.len(),
        prompt.text().len(),
        media
    )
}
