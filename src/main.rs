use doctalk::api;
use doctalk::commands::{print_banner, CommandHandler};
use doctalk::config::AppConfig;
use doctalk::document::ContentLoader;
use doctalk::providers::ollama::OllamaProvider;
use doctalk::providers::traits::CompletionProvider;
use doctalk::session::SessionController;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Ask questions about a CSV, PDF or web page", long_about = None)]
struct Args {
    /// Serve the HTTP API instead of the terminal session
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,

    /// Model name, overrides DOCTALK_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Ollama base URL, overrides OLLAMA_URL
    #[arg(long)]
    ollama_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    colored::control::set_override(true);

    dotenv().ok();
    let args = Args::parse();

    // Terminal mode logs warnings only unless RUST_LOG says otherwise.
    let default_level = if args.api { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = AppConfig::from_env().with_overrides(args.model.clone(), args.ollama_url.clone());
    log::info!("Using model {} at {}", config.model, config.ollama_url);

    let provider: Arc<dyn CompletionProvider> = Arc::new(OllamaProvider::from_config(&config));
    let loader = ContentLoader::default();

    if args.api {
        run_api_server(args.port, loader, provider).await
    } else {
        run_cli_mode(&config, loader, provider).await
    }
}

async fn run_cli_mode(
    config: &AppConfig,
    loader: ContentLoader,
    provider: Arc<dyn CompletionProvider>,
) -> anyhow::Result<()> {
    print_banner(&config.model);

    let mut command_handler = CommandHandler::new(SessionController::new(loader, provider));
    command_handler.show_input_types();

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline(&command_handler.prompt()) {
            Ok(line) => {
                let input = line.trim();
                if !input.is_empty() {
                    let _ = rl.add_history_entry(input);
                }

                match command_handler.handle_command(input).await {
                    Ok(ControlFlow::Break(())) => break,
                    Ok(ControlFlow::Continue(())) => {}
                    Err(e) => println!("{}", e.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(
    port: u16,
    loader: ContentLoader,
    provider: Arc<dyn CompletionProvider>,
) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = api::create_api(loader, provider);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;
    log::info!("DocTalk API listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
