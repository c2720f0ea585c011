use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};
use super::ImageGenerator;
use crate::{
    config::GeminiConfig,
    error::{Result, ThumbnailError},
    models::{DataUri, GeneratedImage, GenerationSettings, PromptPayload, PromptSegment},
};

const INVALID_KEY_MARKERS: [&str; 3] = ["API key not valid", "API key expired", "API_KEY_INVALID"];

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model_id: &str) -> String {
        let model = model_id.strip_prefix("googleai/").unwrap_or(model_id);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &PromptPayload,
        settings: &GenerationSettings,
    ) -> Result<GeneratedImage> {
        let api_key = settings.api_key.as_deref().ok_or_else(|| {
            ThumbnailError::InvalidCredential(
                "API key not set. Provide a Google AI API key or set GOOGLE_API_KEY.".into(),
            )
        })?;

        let body = build_request(prompt, settings)?;
        let url = self.endpoint(&settings.model_id);

        log::info!("Generating thumbnail with model: {}", settings.model_id);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Image generation transport error: {:?}", e);
                ThumbnailError::RequestError(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;

        if !status.is_success() {
            let err = classify_error(status, &text);
            log::error!("Image generation failed ({}): {}", status, err);
            return Err(err);
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| ThumbnailError::ResponseError(e.to_string()))?;
        extract_image(parsed)
    }
}

pub(crate) fn build_request(
    prompt: &PromptPayload,
    settings: &GenerationSettings,
) -> Result<GenerateContentRequest> {
    let mut parts = Vec::with_capacity(prompt.segments.len());
    for segment in &prompt.segments {
        match segment {
            PromptSegment::Media { url } => {
                let image = DataUri::parse(url)?;
                parts.push(Part::inline(image.mime_type, image.payload));
            }
            PromptSegment::Text(text) => parts.push(Part::text(text.clone())),
        }
    }

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: GenerationConfig {
            response_modalities: settings.response_modalities.clone(),
        },
    })
}

/// Maps a failed response onto the error taxonomy, keeping the provider message intact.
pub(crate) fn classify_error(status: StatusCode, body: &str) -> ThumbnailError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let message = match &envelope {
        Some(env) if !env.error.message.is_empty() => env.error.message.clone(),
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => body.trim().to_string(),
    };

    let credential_status = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN);
    let credential_reason = envelope.as_ref().map_or(false, |env| {
        env.error.reasons().any(|r| r == "API_KEY_INVALID")
            || env.error.status.as_deref() == Some("UNAUTHENTICATED")
    });
    let credential_message = INVALID_KEY_MARKERS.iter().any(|m| message.contains(m));

    if credential_status || credential_reason || credential_message {
        ThumbnailError::InvalidCredential(message)
    } else {
        ThumbnailError::ExternalFailure(message)
    }
}

pub(crate) fn extract_image(response: GenerateContentResponse) -> Result<GeneratedImage> {
    let mut image = None;
    let mut commentary = Vec::new();

    for part in response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
    {
        if let Some(inline) = part.inline_data {
            if image.is_none() && inline.mime_type.starts_with("image/") {
                image = Some(DataUri::new(inline.mime_type, inline.data));
            }
        } else if let Some(text) = part.text {
            if !text.trim().is_empty() {
                commentary.push(text);
            }
        }
    }

    match image {
        Some(uri) => Ok(GeneratedImage {
            data_uri: uri.to_string(),
            text: if commentary.is_empty() {
                None
            } else {
                Some(commentary.join("\n"))
            },
        }),
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .map(|reason| format!("Prompt blocked: {}", reason))
                .unwrap_or_else(|| "No image returned by the model".to_string());
            Err(ThumbnailError::ExternalFailure(reason))
        }
    }
}
