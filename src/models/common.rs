use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseModality {
    Image,
    Text,
}

/// Per-call configuration handed to the image generator alongside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model_id: String,
    pub response_modalities: Vec<ResponseModality>,
    pub api_key: Option<String>,
}

impl GenerationSettings {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            response_modalities: vec![ResponseModality::Image, ResponseModality::Text],
            api_key: None,
        }
    }
}
