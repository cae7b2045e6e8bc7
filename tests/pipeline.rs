use anyhow::Result;
use async_trait::async_trait;
use axum::{http::StatusCode, response::Html, routing::get, routing::post, Router};
use doctalk::document::{PageParser, PdfExtractParser};
use doctalk::error::{GenerationErrorKind, LoadErrorKind};
use doctalk::providers::ollama::OllamaProvider;
use doctalk::providers::traits::CompletionProvider;
use doctalk::{ContentLoader, InputType, SessionController, SessionError, SourceHandle, Stage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for CountingProvider {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("FOR THE GIVEN QUESTION What is in row 2?, the answer is Bob, 25.".to_string())
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok("counting".to_string())
    }
}

/// Wraps the real PDF parser and remembers which temp file it was handed.
#[derive(Default)]
struct TrackingPdfParser {
    path: Mutex<Option<PathBuf>>,
}

impl PageParser for TrackingPdfParser {
    fn parse_pages(&self, path: &Path) -> std::result::Result<Vec<String>, String> {
        *self.path.lock().unwrap() = Some(path.to_path_buf());
        PdfExtractParser.parse_pages(path)
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

#[tokio::test]
async fn csv_question_is_answered() {
    let provider = Arc::new(CountingProvider::default());
    let mut session = SessionController::new(ContentLoader::default(), provider.clone());

    session.select_input_type(InputType::Tabular);
    session
        .provide_source(SourceHandle::Upload(b"name,age\nAlice,30\nBob,25\nCarol,41\n".to_vec()))
        .unwrap();

    let answer = session.ask("What is in row 2?").await.unwrap();

    assert_eq!(session.stage(), Stage::Displaying);
    assert_eq!(session.context().last_answer.as_deref(), Some(answer.as_str()));
    assert!(answer.starts_with("FOR THE GIVEN QUESTION What is in row 2?"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unparseable_pdf_aborts_and_leaves_no_temp_file() {
    let provider = Arc::new(CountingProvider::default());
    let parser = Arc::new(TrackingPdfParser::default());
    let loader = ContentLoader::new(reqwest::Client::new(), parser.clone());
    let mut session = SessionController::new(loader, provider.clone());

    session.select_input_type(InputType::PaginatedDocument);
    session
        .provide_source(SourceHandle::Upload(b"\x00\x01 this is not a pdf".to_vec()))
        .unwrap();

    let err = session.ask("What is this about?").await.unwrap_err();
    match err {
        SessionError::Load(e) => assert_eq!(e.kind(), LoadErrorKind::UnreadablePDF),
        other => panic!("expected a load error, got {:?}", other),
    }
    assert_eq!(session.stage(), Stage::Failed);
    assert!(session.context().last_answer.is_none());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

    let path = parser.path.lock().unwrap().clone().expect("parser should have run");
    assert!(!path.exists(), "temp file {} was left behind", path.display());
}

#[tokio::test]
async fn unreachable_url_aborts_with_network_error() {
    let provider = Arc::new(CountingProvider::default());
    let mut session = SessionController::new(ContentLoader::default(), provider.clone());

    session.select_input_type(InputType::WebPage);
    session.provide_source(SourceHandle::Url(closed_port_url().await)).unwrap();

    let err = session.ask("What is on the page?").await.unwrap_err();
    assert_eq!(err.kind_name(), "NetworkError");
    assert_eq!(session.stage(), Stage::Failed);
    assert!(session.context().last_error.is_some());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn web_page_sections_are_joined_by_newline() {
    let base = serve(Router::new().route(
        "/menu",
        get(|| async { Html("<html><body><h1>Menu</h1><p>Soup</p><p>Bread</p></body></html>") }),
    ))
    .await;

    let text = ContentLoader::default()
        .load(InputType::WebPage, &SourceHandle::Url(format!("{}/menu", base)))
        .await
        .unwrap();
    assert_eq!(text.as_str(), "Menu\nSoup\nBread");
    assert_eq!(text.unit_count(), 3);
}

#[tokio::test]
async fn web_page_without_text_is_empty_page() {
    let base = serve(Router::new().route(
        "/blank",
        get(|| async { Html("<html><body><script>render()</script></body></html>") }),
    ))
    .await;

    let err = ContentLoader::default()
        .load(InputType::WebPage, &SourceHandle::Url(format!("{}/blank", base)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), LoadErrorKind::EmptyPage);
}

#[tokio::test]
async fn web_page_error_status_is_network_error() {
    let base = serve(Router::new()).await;

    let err = ContentLoader::default()
        .load(InputType::WebPage, &SourceHandle::Url(format!("{}/missing", base)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), LoadErrorKind::NetworkError);
}

#[tokio::test]
async fn failing_backend_is_called_exactly_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let base = serve(Router::new().route(
        "/api/generate",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::INTERNAL_SERVER_ERROR, "model crashed")
            }
        }),
    ))
    .await;

    let provider: Arc<dyn CompletionProvider> = Arc::new(OllamaProvider::new(base, "llama3.2"));
    let mut session = SessionController::new(ContentLoader::default(), provider);
    session.select_input_type(InputType::Tabular);
    session
        .provide_source(SourceHandle::Upload(b"name\nAlice\n".to_vec()))
        .unwrap();

    let err = session.ask("Who?").await.unwrap_err();
    match err {
        SessionError::Generation(e) => assert_eq!(e.kind(), GenerationErrorKind::BackendError),
        other => panic!("expected a generation error, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(session.stage(), Stage::Failed);
}
