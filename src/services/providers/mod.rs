/// Text generation provider abstraction
///
/// The optional AI enrichment source. Every caller must keep working when no
/// provider is configured or the provider misbehaves, so results from here
/// are always treated as untrusted free text.
use crate::error::AppResult;

pub mod http_text;

pub use http_text::HttpTextGenerator;

/// Trait for free-text generation services
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for a natural-language prompt
    async fn generate(&self, prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
