use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::ops::ControlFlow;
use std::time::Duration;

use crate::document::{InputType, SourceHandle};
use crate::session::{SessionController, Stage};

mod source;
mod system;

pub use system::print_banner;

/// Terminal front end: turns each line the user types into the next step of the session.
pub struct CommandHandler {
    session: SessionController,
}

impl CommandHandler {
    pub fn new(session: SessionController) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Prompt text for the current stage.
    pub fn prompt(&self) -> String {
        let input_type = self.session.context().input_type;
        match (self.session.stage(), input_type) {
            (Stage::AwaitingInputType, _) | (_, None) => "Choose input type: ".to_string(),
            (Stage::AwaitingSource, Some(InputType::WebPage)) => "Enter the website URL: ".to_string(),
            (Stage::AwaitingSource, Some(input_type)) => {
                format!("Upload a {} file (path): ", input_type)
            }
            (_, Some(InputType::Tabular)) => "Enter your question for the given file: ".to_string(),
            (_, Some(InputType::PaginatedDocument)) => "Enter your question about the PDF: ".to_string(),
            (_, Some(InputType::WebPage)) => "Enter your question about the website: ".to_string(),
        }
    }

    pub fn show_input_types(&self) {
        system::print_input_types();
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<ControlFlow<()>, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }

        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input),
            "switch" => {
                self.session.reset();
                system::print_input_types();
                return Ok(ControlFlow::Continue(()));
            }
            _ => {}
        }

        let result = match self.session.stage() {
            Stage::AwaitingInputType => self.handle_input_type(input),
            Stage::AwaitingSource => self.handle_source(input).await,
            _ => self.handle_question(input).await,
        };
        result.map(|_| ControlFlow::Continue(()))
    }

    fn handle_input_type(&mut self, input: &str) -> Result<(), String> {
        let input_type = input.parse::<InputType>()?;
        self.session.select_input_type(input_type);
        println!("📎 Input type: {}", input_type.label().bright_yellow());
        Ok(())
    }

    async fn handle_source(&mut self, input: &str) -> Result<(), String> {
        let input_type = self
            .session
            .context()
            .input_type
            .ok_or("Choose an input type first.")?;

        if input_type.takes_upload() {
            let bytes = source::read_upload(input, input_type).await?;
            self.session
                .provide_source(SourceHandle::Upload(bytes))
                .map_err(|e| e.to_string())?;
            println!("{}", format!("{} file uploaded successfully!", input_type).green());
        } else {
            self.session
                .provide_source(SourceHandle::Url(input.to_string()))
                .map_err(|e| e.to_string())?;
            println!("{}", format!("URL entered: {}", input.trim()).green());
        }
        Ok(())
    }

    async fn handle_question(&mut self, question: &str) -> Result<(), String> {
        let message = match self.session.context().input_type {
            Some(InputType::PaginatedDocument) => "Thinking... 🤔",
            _ => "Getting your answer ... 🤔",
        };
        let spinner = spinner(message);

        let result = self.session.ask(question).await;
        spinner.finish_and_clear();

        let answer = result.map_err(|e| e.to_string())?;
        println!("{}", "Done!".green());
        println!("{}", answer.truecolor(255, 236, 179));
        println!();
        Ok(())
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ContentLoader;
    use crate::providers::traits::CompletionProvider;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Arc;

    struct EchoProvider;

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("{} chars", prompt.len()))
        }

        async fn get_model_info(&self) -> Result<String> {
            Ok("echo".to_string())
        }
    }

    fn handler() -> CommandHandler {
        CommandHandler::new(SessionController::new(
            ContentLoader::default(),
            Arc::new(EchoProvider),
        ))
    }

    #[tokio::test]
    async fn test_walks_through_csv_session() {
        let mut csv = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        csv.write_all(b"name\nAlice\nBob\n").unwrap();

        let mut handler = handler();
        assert_eq!(handler.prompt(), "Choose input type: ");

        handler.handle_command("CSV").await.unwrap();
        assert_eq!(handler.prompt(), "Upload a CSV file (path): ");

        handler
            .handle_command(csv.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(handler.prompt(), "Enter your question for the given file: ");

        handler.handle_command("Who is listed?").await.unwrap();
        assert_eq!(handler.session().stage(), Stage::Displaying);
    }

    #[tokio::test]
    async fn test_switch_and_exit() {
        let mut handler = handler();
        handler.handle_command("3").await.unwrap();
        assert_eq!(handler.prompt(), "Enter the website URL: ");

        handler.handle_command("switch").await.unwrap();
        assert_eq!(handler.session().stage(), Stage::AwaitingInputType);

        assert_eq!(handler.handle_command("exit").await.unwrap(), ControlFlow::Break(()));
    }

    #[tokio::test]
    async fn test_unknown_input_type_is_reported() {
        let mut handler = handler();
        assert!(handler.handle_command("docx").await.is_err());
        assert_eq!(handler.session().stage(), Stage::AwaitingInputType);
    }
}
