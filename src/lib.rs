pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod prompt;
#[cfg(feature = "server")]
pub mod server;

pub use config::{Config, GeminiConfig};
pub use credentials::{CredentialProvider, EnvFallback, FileCredentialStore, InMemoryCredentials};
pub use dispatcher::{ThumbnailGenerator, VARIANT_COUNT};
pub use error::{ErrorKind, Result, ThumbnailError};
pub use gemini::{GeminiClient, ImageGenerator};
pub use models::*;
pub use prompt::build_prompt;
