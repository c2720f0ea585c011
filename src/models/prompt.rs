use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptSegment {
    /// Reference image, carried as the caller's data URI.
    Media { url: String },
    Text(String),
}

/// Ordered segments sent to the model for one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptPayload {
    pub segments: Vec<PromptSegment>,
}

impl PromptPayload {
    pub fn new(segments: Vec<PromptSegment>) -> Self {
        Self { segments }
    }

    /// All text segments joined together.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                PromptSegment::Text(text) => Some(text.as_str()),
                PromptSegment::Media { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn media(&self) -> Option<&str> {
        self.segments.iter().find_map(|segment| match segment {
            PromptSegment::Media { url } => Some(url.as_str()),
            PromptSegment::Text(_) => None,
        })
    }
}
