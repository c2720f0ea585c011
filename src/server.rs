//! JSON HTTP surface for the thumbnail generator.
//!
//! Form validation lives here rather than in the generator: prompts and
//! descriptions need at least ten characters, and reference images must
//! arrive as base64 data URIs.

use actix_web::{http::StatusCode, web, App, HttpResponse, HttpServer, ResponseError};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    dispatcher::ThumbnailGenerator,
    error::{ErrorKind, Result, ThumbnailError},
    models::{AspectRatio, DataUri, GenerationRequest, ImageOrigin, TextOrigin},
};

const MIN_DESCRIPTION_CHARS: usize = 10;

pub struct AppState {
    pub thumbnails: ThumbnailGenerator,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextForm {
    pub prompt: String,
    #[serde(default)]
    pub thumbnail_text: Option<String>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageForm {
    pub photo_data_uri: String,
    pub description: String,
    #[serde(default)]
    pub thumbnail_text: Option<String>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyForm {
    pub api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyStatus {
    pub configured: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

fn require_min_length(field: &str, value: &str) -> Result<()> {
    if value.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(ThumbnailError::InvalidInput(format!(
            "{} must be at least {} characters long.",
            field, MIN_DESCRIPTION_CHARS
        )));
    }
    Ok(())
}

impl TextForm {
    pub fn into_request(self) -> Result<GenerationRequest> {
        require_min_length("Prompt", &self.prompt)?;
        Ok(GenerationRequest::Text(TextOrigin {
            prompt_text: self.prompt,
            overlay_text: self.thumbnail_text,
            aspect_ratio: self.aspect_ratio,
            api_key: self.api_key,
        }))
    }
}

impl ImageForm {
    pub fn into_request(self) -> Result<GenerationRequest> {
        if self.photo_data_uri.trim().is_empty() {
            return Err(ThumbnailError::InvalidInput("Image is required.".into()));
        }
        DataUri::parse(&self.photo_data_uri)?;
        require_min_length("Description", &self.description)?;

        Ok(GenerationRequest::Image(ImageOrigin {
            reference_image: self.photo_data_uri,
            description: self.description,
            overlay_text: self.thumbnail_text,
            aspect_ratio: self.aspect_ratio,
            api_key: self.api_key,
        }))
    }
}

impl ResponseError for ThumbnailError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidCredential => StatusCode::UNAUTHORIZED,
            ErrorKind::ExternalFailure => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            kind: self.kind().as_str(),
        })
    }
}

async fn generate_from_text(
    state: web::Data<AppState>,
    form: web::Json<TextForm>,
) -> Result<HttpResponse> {
    let request = form.into_inner().into_request()?;
    let result = state.thumbnails.generate(&request).await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn generate_from_image(
    state: web::Data<AppState>,
    form: web::Json<ImageForm>,
) -> Result<HttpResponse> {
    let request = form.into_inner().into_request()?;
    let result = state.thumbnails.generate(&request).await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn key_status(state: web::Data<AppState>) -> HttpResponse {
    let configured = state.thumbnails.credentials().get().await.is_some();
    HttpResponse::Ok().json(KeyStatus { configured })
}

async fn save_key(state: web::Data<AppState>, form: web::Json<KeyForm>) -> Result<HttpResponse> {
    state.thumbnails.credentials().set(&form.api_key).await?;
    Ok(HttpResponse::Ok().json(KeyStatus { configured: true }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/thumbnails/text", web::post().to(generate_from_text))
            .route("/thumbnails/image", web::post().to(generate_from_image))
            .route("/key", web::get().to(key_status))
            .route("/key", web::put().to(save_key)),
    );
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let port = config.port.unwrap_or(8080);
    let state = web::Data::new(AppState {
        thumbnails: ThumbnailGenerator::from_config(&config),
    });

    log::info!("🌐 Listening on http://127.0.0.1:{}", port);

    HttpServer::new(move || {
        App::new()
            // Reference images arrive inline as base64.
            .app_data(web::JsonConfig::default().limit(20 * 1024 * 1024))
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::{
        config::GeminiConfig,
        credentials::{CredentialProvider, InMemoryCredentials},
        gemini::ImageGenerator,
        models::{GeneratedImage, GenerationSettings, PromptPayload},
    };

    struct EchoGenerator {
        reject_with: Option<&'static str>,
    }

    #[async_trait]
    impl ImageGenerator for EchoGenerator {
        async fn generate(
            &self,
            _prompt: &PromptPayload,
            _settings: &GenerationSettings,
        ) -> Result<GeneratedImage> {
            match self.reject_with {
                Some(message) => Err(ThumbnailError::InvalidCredential(message.into())),
                None => Ok(GeneratedImage::new("data:image/png;base64,AAAA")),
            }
        }
    }

    fn state(reject_with: Option<&'static str>) -> web::Data<AppState> {
        let credentials: Arc<dyn CredentialProvider> = Arc::new(InMemoryCredentials::new());
        web::Data::new(AppState {
            thumbnails: ThumbnailGenerator::new(
                Arc::new(EchoGenerator { reject_with }),
                credentials,
                &GeminiConfig::new(),
            ),
        })
    }

    #[actix_web::test]
    async fn text_form_returns_three_thumbnails() {
        let app = test::init_service(App::new().app_data(state(None)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/thumbnails/text")
            .set_json(json!({
                "prompt": "a red bicycle on a beach",
                "thumbnailText": "SALE!",
                "aspectRatio": "square"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        for field in ["thumbnail1", "thumbnail2", "thumbnail3"] {
            assert_eq!(body[field], "data:image/png;base64,AAAA");
        }
    }

    #[actix_web::test]
    async fn short_prompt_is_rejected_before_generation() {
        let app = test::init_service(App::new().app_data(state(None)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/thumbnails/text")
            .set_json(json!({ "prompt": "too short" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "invalid_input");
    }

    #[actix_web::test]
    async fn image_form_requires_a_data_uri() {
        let app = test::init_service(App::new().app_data(state(None)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/thumbnails/image")
            .set_json(json!({
                "photoDataUri": "https://example.com/me.png",
                "description": "make it look like a comic book"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn bad_key_maps_to_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(state(Some("API key not valid. Please pass a valid API key.")))
                .configure(configure),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/thumbnails/image")
            .set_json(json!({
                "photoDataUri": "data:image/png;base64,iVBORw0KGgo=",
                "description": "make it look like a comic book"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "invalid_credential");
        assert!(body["error"].as_str().unwrap().contains("API key not valid"));
    }

    #[actix_web::test]
    async fn saving_a_key_marks_it_configured() {
        let app = test::init_service(App::new().app_data(state(None)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/key").to_request();
        let status: KeyStatus = test::call_and_read_body_json(&app, req).await;
        assert!(!status.configured);

        let req = test::TestRequest::put()
            .uri("/api/key")
            .set_json(json!({ "apiKey": "AIza-new" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/key").to_request();
        let status: KeyStatus = test::call_and_read_body_json(&app, req).await;
        assert!(status.configured);
    }
}
