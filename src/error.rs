use serde::Serialize;
use thiserror::Error;

/// Which loader step failed, without the detail message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadErrorKind {
    MalformedInput,
    UnreadablePDF,
    NetworkError,
    EmptyPage,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Could not parse the uploaded file: {0}")]
    MalformedInput(String),
    #[error("Could not read the PDF: {0}")]
    UnreadablePDF(String),
    #[error("Could not fetch the website: {0}")]
    NetworkError(String),
    #[error("No readable text was found on the page: {0}")]
    EmptyPage(String),
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::MalformedInput(_) => LoadErrorKind::MalformedInput,
            LoadError::UnreadablePDF(_) => LoadErrorKind::UnreadablePDF,
            LoadError::NetworkError(_) => LoadErrorKind::NetworkError,
            LoadError::EmptyPage(_) => LoadErrorKind::EmptyPage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationErrorKind {
    BackendUnreachable,
    BackendError,
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("The language model backend is unreachable: {0}")]
    BackendUnreachable(String),
    #[error("The language model backend returned an error: {0}")]
    BackendError(String),
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GenerationError::BackendUnreachable(_) => GenerationErrorKind::BackendUnreachable,
            GenerationError::BackendError(_) => GenerationErrorKind::BackendError,
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    NotReady(String),
    #[error("Invalid source: {0}")]
    InvalidSource(String),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl SessionError {
    /// Short machine-readable tag, used by the HTTP layer.
    pub fn kind_name(&self) -> String {
        match self {
            SessionError::NotReady(_) => "NotReady".to_string(),
            SessionError::InvalidSource(_) => "InvalidSource".to_string(),
            SessionError::Load(e) => format!("{:?}", e.kind()),
            SessionError::Generation(e) => format!("{:?}", e.kind()),
        }
    }
}
