use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThumbnailError};
use crate::models::DataUri;

/// One image returned by a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub data_uri: String,
    /// Any commentary the model returned next to the image.
    pub text: Option<String>,
}

impl GeneratedImage {
    pub fn new(data_uri: impl Into<String>) -> Self {
        Self {
            data_uri: data_uri.into(),
            text: None,
        }
    }
}

/// Exactly three thumbnails, in the order their calls were issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationResult {
    pub thumbnail1: String,
    pub thumbnail2: String,
    pub thumbnail3: String,
}

impl GenerationResult {
    pub fn from_array([thumbnail1, thumbnail2, thumbnail3]: [String; 3]) -> Self {
        Self {
            thumbnail1,
            thumbnail2,
            thumbnail3,
        }
    }

    pub fn as_array(&self) -> [&str; 3] {
        [&self.thumbnail1, &self.thumbnail2, &self.thumbnail3]
    }

    pub fn into_vec(self) -> Vec<String> {
        vec![self.thumbnail1, self.thumbnail2, self.thumbnail3]
    }

    /// Writes `thumbnail-1.<ext>` .. `thumbnail-3.<ext>` into `dir`.
    pub fn save_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| {
            ThumbnailError::StorageError(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let mut paths = Vec::with_capacity(3);
        for (index, uri) in self.as_array().iter().enumerate() {
            let image = DataUri::parse(uri)?;
            let bytes = image.decode()?;
            let path = dir.join(format!("thumbnail-{}.{}", index + 1, image.extension()));
            std::fs::write(&path, bytes).map_err(|e| {
                ThumbnailError::StorageError(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::info!("💾 Thumbnail saved to: {}", path.display());
            paths.push(path);
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GenerationResult {
        GenerationResult::from_array([
            DataUri::from_bytes("image/png", b"one").to_string(),
            DataUri::from_bytes("image/jpeg", b"two").to_string(),
            DataUri::from_bytes("image/png", b"three").to_string(),
        ])
    }

    #[test]
    fn serializes_with_numbered_fields() {
        let result = GenerationResult::from_array(["A".into(), "B".into(), "C".into()]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["thumbnail1"], "A");
        assert_eq!(json["thumbnail3"], "C");
        assert_eq!(result.into_vec(), vec!["A", "B", "C"]);
    }

    #[test]
    fn saves_each_thumbnail_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = sample().save_to_dir(dir.path()).unwrap();

        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("thumbnail-1.png"));
        assert!(paths[1].ends_with("thumbnail-2.jpg"));
        assert_eq!(std::fs::read(&paths[2]).unwrap(), b"three");
    }
}
