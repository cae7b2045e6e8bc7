use super::DocumentText;
use crate::error::LoadError;
use reqwest::Client;
use scraper::Html;
use url::Url;

const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Fetches a page and returns its visible text, one section per text node, in document order.
pub async fn load_web_page(client: &Client, url: &str) -> Result<DocumentText, LoadError> {
    let url = parse_url(url)?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| LoadError::NetworkError(format!("Failed to reach {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::NetworkError(format!(
            "{} responded with status {}",
            url, status
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| LoadError::NetworkError(format!("Failed to read body of {}: {}", url, e)))?;

    let sections = extract_sections(&body);
    if sections.is_empty() {
        return Err(LoadError::EmptyPage(url.to_string()));
    }

    Ok(DocumentText::from_units(sections))
}

fn parse_url(raw: &str) -> Result<Url, LoadError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| LoadError::NetworkError(format!("Invalid URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(LoadError::NetworkError(format!(
            "Unsupported URL scheme '{}'",
            scheme
        ))),
    }
}

/// Visible text nodes of an HTML document with whitespace collapsed.
pub fn extract_sections(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map_or(false, |element| SKIPPED_ELEMENTS.contains(&element.name()))
            });
            if hidden {
                return None;
            }

            let section = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!section.is_empty()).then_some(section)
        })
        .collect()
}
