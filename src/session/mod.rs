use crate::document::{ContentLoader, InputType, SourceHandle};
use crate::error::SessionError;
use crate::llm::{answer, prompt};
use crate::providers::traits::CompletionProvider;
use serde::Serialize;
use std::sync::Arc;

/// Where a session is in the select → source → question → answer flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Stage {
    #[default]
    AwaitingInputType,
    AwaitingSource,
    AwaitingQuestion,
    Processing,
    Displaying,
    Failed,
}

/// Everything one user's session holds. Rebuilt per request; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub input_type: Option<InputType>,
    pub source: Option<SourceHandle>,
    pub question: Option<String>,
    pub stage: Stage,
    pub last_answer: Option<String>,
    pub last_error: Option<String>,
}

/// Drives one session: validates each step and runs load → format → generate.
pub struct SessionController {
    context: SessionContext,
    loader: ContentLoader,
    provider: Arc<dyn CompletionProvider>,
}

impl SessionController {
    pub fn new(loader: ContentLoader, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            context: SessionContext::default(),
            loader,
            provider,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn stage(&self) -> Stage {
        self.context.stage
    }

    /// Back to input-type selection.
    pub fn reset(&mut self) {
        self.context = SessionContext::default();
    }

    /// Starts over with a new input type, dropping any source, question and result.
    pub fn select_input_type(&mut self, input_type: InputType) {
        log::info!("Input type selected: {}", input_type);
        self.context = SessionContext {
            input_type: Some(input_type),
            stage: Stage::AwaitingSource,
            ..SessionContext::default()
        };
    }

    pub fn provide_source(&mut self, source: SourceHandle) -> Result<(), SessionError> {
        let input_type = self
            .context
            .input_type
            .ok_or_else(|| SessionError::NotReady("Choose an input type first.".to_string()))?;

        let source = match (input_type.takes_upload(), source) {
            (true, SourceHandle::Upload(bytes)) if bytes.is_empty() => {
                return Err(SessionError::InvalidSource("the uploaded file is empty".to_string()))
            }
            (true, SourceHandle::Upload(bytes)) => SourceHandle::Upload(bytes),
            (false, SourceHandle::Url(url)) if url.trim().is_empty() => {
                return Err(SessionError::InvalidSource("the URL is empty".to_string()))
            }
            (false, SourceHandle::Url(url)) => SourceHandle::Url(url.trim().to_string()),
            (_, other) => {
                return Err(SessionError::InvalidSource(format!(
                    "{} input does not accept {}",
                    input_type,
                    other.describe()
                )))
            }
        };

        log::info!("Source provided for {}: {}", input_type, source.describe());
        self.context.source = Some(source);
        self.context.question = None;
        self.context.last_answer = None;
        self.context.last_error = None;
        self.context.stage = Stage::AwaitingQuestion;
        Ok(())
    }

    /// Answers a question against the current source. The source is loaded again for
    /// every question. Any stage failure leaves the session in [`Stage::Failed`].
    pub async fn ask(&mut self, question: &str) -> Result<String, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::NotReady("Enter a question.".to_string()));
        }
        let (input_type, source) = match (self.context.input_type, self.context.source.clone()) {
            (Some(input_type), Some(source)) => (input_type, source),
            (None, _) => return Err(SessionError::NotReady("Choose an input type first.".to_string())),
            (Some(input_type), None) => {
                return Err(SessionError::NotReady(match input_type {
                    InputType::WebPage => "Enter a website URL first.".to_string(),
                    other => format!("Upload a {} file first.", other),
                }))
            }
        };

        self.context.question = Some(question.to_string());
        self.context.last_answer = None;
        self.context.last_error = None;
        self.context.stage = Stage::Processing;

        match self.run_pipeline(input_type, &source, question).await {
            Ok(answer) => {
                self.context.last_answer = Some(answer.clone());
                self.context.stage = Stage::Displaying;
                Ok(answer)
            }
            Err(e) => {
                log::warn!("Question failed for {} source: {}", input_type, e);
                self.context.last_error = Some(e.to_string());
                self.context.stage = Stage::Failed;
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        input_type: InputType,
        source: &SourceHandle,
        question: &str,
    ) -> Result<String, SessionError> {
        let data = self.loader.load(input_type, source).await?;
        let instruction = prompt::format(question, &data);
        let answer = answer::generate(self.provider.as_ref(), &instruction).await?;
        Ok(answer)
    }
}
