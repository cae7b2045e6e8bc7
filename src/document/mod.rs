mod pdf;
mod tabular;
mod web;

pub use pdf::{load_pdf, PageParser, PdfExtractParser};
pub use tabular::load_csv;
pub use web::{extract_sections, load_web_page};

use crate::error::LoadError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The three kinds of source a session can ask questions about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputType {
    #[serde(rename = "CSV")]
    Tabular,
    #[serde(rename = "PDF")]
    PaginatedDocument,
    #[serde(rename = "Website URL")]
    WebPage,
}

impl InputType {
    /// Selector order shown to the user.
    pub const ALL: [InputType; 3] = [
        InputType::Tabular,
        InputType::PaginatedDocument,
        InputType::WebPage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InputType::Tabular => "CSV",
            InputType::PaginatedDocument => "PDF",
            InputType::WebPage => "Website URL",
        }
    }

    /// File extension accepted for uploads, `None` for URL input.
    pub fn file_extension(&self) -> Option<&'static str> {
        match self {
            InputType::Tabular => Some("csv"),
            InputType::PaginatedDocument => Some("pdf"),
            InputType::WebPage => None,
        }
    }

    pub fn takes_upload(&self) -> bool {
        self.file_extension().is_some()
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "1" => Ok(InputType::Tabular),
            "pdf" | "2" => Ok(InputType::PaginatedDocument),
            "website url" | "website" | "url" | "web" | "3" => Ok(InputType::WebPage),
            other => Err(format!(
                "Unknown input type '{}'. Choose one of: CSV, PDF, Website URL",
                other
            )),
        }
    }
}

/// Where the document comes from: uploaded bytes or a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceHandle {
    Upload(Vec<u8>),
    Url(String),
}

impl SourceHandle {
    pub fn describe(&self) -> String {
        match self {
            SourceHandle::Upload(bytes) => format!("upload ({} bytes)", bytes.len()),
            SourceHandle::Url(url) => url.clone(),
        }
    }
}

/// All text extracted from one source, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    text: String,
    units: usize,
}

impl DocumentText {
    pub fn from_units<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let units: Vec<S> = units.into_iter().collect();
        Self {
            text: join_units(&units),
            units: units.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of rows, pages or sections the text was built from.
    pub fn unit_count(&self) -> usize {
        self.units
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for DocumentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Joins ordered text units with a single newline. Every strategy goes through here.
pub fn join_units<S: AsRef<str>>(units: &[S]) -> String {
    units
        .iter()
        .map(|unit| unit.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Picks the loading strategy for an input type and runs it.
#[derive(Clone)]
pub struct ContentLoader {
    client: Client,
    page_parser: Arc<dyn PageParser>,
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new(Client::new(), Arc::new(PdfExtractParser))
    }
}

impl ContentLoader {
    pub fn new(client: Client, page_parser: Arc<dyn PageParser>) -> Self {
        Self {
            client,
            page_parser,
        }
    }

    pub async fn load(
        &self,
        input_type: InputType,
        source: &SourceHandle,
    ) -> Result<DocumentText, LoadError> {
        log::info!("Loading {} source: {}", input_type, source.describe());

        let text = match (input_type, source) {
            (InputType::Tabular, SourceHandle::Upload(bytes)) => load_csv(bytes)?,
            (InputType::PaginatedDocument, SourceHandle::Upload(bytes)) => {
                load_pdf(bytes, self.page_parser.clone()).await?
            }
            (InputType::WebPage, SourceHandle::Url(url)) => {
                load_web_page(&self.client, url).await?
            }
            (input_type, source) => {
                return Err(LoadError::MalformedInput(format!(
                    "{} input cannot be loaded from {}",
                    input_type,
                    source.describe()
                )))
            }
        };

        log::info!(
            "Loaded {} units ({} chars) from {} source",
            text.unit_count(),
            text.as_str().len(),
            input_type
        );
        Ok(text)
    }
}
