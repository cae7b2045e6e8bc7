pub mod api;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod llm;
pub mod providers;
pub mod session;

// Re-export commonly used items
pub use config::AppConfig;
pub use document::{ContentLoader, DocumentText, InputType, SourceHandle};
pub use error::{GenerationError, LoadError, SessionError};
pub use session::{SessionController, SessionContext, Stage};
