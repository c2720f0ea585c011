use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    #[default]
    Landscape,
    Square,
}

impl AspectRatio {
    /// Wording injected into the prompt. The model has no separate ratio parameter.
    pub fn phrase(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9 landscape",
            AspectRatio::Square => "1:1 square",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextOrigin {
    pub prompt_text: String,
    #[serde(default)]
    pub overlay_text: Option<String>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageOrigin {
    /// `data:<mime>;base64,<payload>`, passed to the model as-is.
    pub reference_image: String,
    pub description: String,
    #[serde(default)]
    pub overlay_text: Option<String>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum GenerationRequest {
    Text(TextOrigin),
    Image(ImageOrigin),
}

impl GenerationRequest {
    pub fn from_text(prompt_text: impl Into<String>) -> Self {
        GenerationRequest::Text(TextOrigin {
            prompt_text: prompt_text.into(),
            overlay_text: None,
            aspect_ratio: AspectRatio::default(),
            api_key: None,
        })
    }

    pub fn from_image(reference_image: impl Into<String>, description: impl Into<String>) -> Self {
        GenerationRequest::Image(ImageOrigin {
            reference_image: reference_image.into(),
            description: description.into(),
            overlay_text: None,
            aspect_ratio: AspectRatio::default(),
            api_key: None,
        })
    }

    pub fn with_overlay_text(mut self, text: Option<String>) -> Self {
        match &mut self {
            GenerationRequest::Text(origin) => origin.overlay_text = text,
            GenerationRequest::Image(origin) => origin.overlay_text = text,
        }
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        match &mut self {
            GenerationRequest::Text(origin) => origin.aspect_ratio = ratio,
            GenerationRequest::Image(origin) => origin.aspect_ratio = ratio,
        }
        self
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        match &mut self {
            GenerationRequest::Text(origin) => origin.api_key = key,
            GenerationRequest::Image(origin) => origin.api_key = key,
        }
        self
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        match self {
            GenerationRequest::Text(origin) => origin.aspect_ratio,
            GenerationRequest::Image(origin) => origin.aspect_ratio,
        }
    }

    /// Overlay text, treating an empty string the same as no overlay.
    pub fn overlay_text(&self) -> Option<&str> {
        let text = match self {
            GenerationRequest::Text(origin) => origin.overlay_text.as_deref(),
            GenerationRequest::Image(origin) => origin.overlay_text.as_deref(),
        };
        text.filter(|t| !t.is_empty())
    }

    pub fn api_key(&self) -> Option<&str> {
        let key = match self {
            GenerationRequest::Text(origin) => origin.api_key.as_deref(),
            GenerationRequest::Image(origin) => origin.api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    pub fn origin_name(&self) -> &'static str {
        match self {
            GenerationRequest::Text(_) => "text",
            GenerationRequest::Image(_) => "image",
        }
    }
}
