use crate::error::GenerationError;
use crate::providers::traits::CompletionProvider;

/// Sends one instruction to the backend and returns its completion.
/// Single attempt: a failing backend is called exactly once.
pub async fn generate(
    provider: &dyn CompletionProvider,
    instruction: &str,
) -> Result<String, GenerationError> {
    log::info!("Generating answer ({} chars of instruction)", instruction.len());

    match provider.complete(instruction).await {
        Ok(completion) => Ok(completion.trim().to_string()),
        Err(e) => {
            let err = match e.downcast::<GenerationError>() {
                Ok(err) => err,
                Err(other) => GenerationError::BackendError(other.to_string()),
            };
            log::warn!("Answer generation failed: {}", err);
            Err(err)
        }
    }
}
