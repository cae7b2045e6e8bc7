use async_trait::async_trait;
use anyhow::Result;

/// A language-model backend that turns one prompt into one completion.
///
/// Implementations should wrap failures in [`crate::error::GenerationError`] so the
/// answer generator can report whether the backend was unreachable or answered with
/// an error; any other error is treated as a backend error.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    async fn get_model_info(&self) -> Result<String>;
}
