use std::env;

pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Process-wide settings. The model is fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model: String,
    pub ollama_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            model: non_empty("DOCTALK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ollama_url: non_empty("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
        }
    }

    /// Applies launcher flags on top of the environment.
    pub fn with_overrides(mut self, model: Option<String>, ollama_url: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(url) = ollama_url {
            self.ollama_url = url;
        }
        self
    }
}
