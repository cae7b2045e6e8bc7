use colored::Colorize;
use std::ops::ControlFlow;

use crate::document::InputType;

pub fn print_banner(model: &str) {
    println!();
    println!("{}", "                DocTalk 🤖".bold().bright_blue());
    println!("{}", "   Ask questions, get smart answers from your files.".bright_white());
    println!();
    println!("📂 {}", "Interact With Your Files Like Never Before".bold());
    println!("   Just drop your document and ask — your AI will do the rest! ⚡");
    println!();
    println!(
        "📂 {}, 🔗 {}, or 📊 {} — then just ask your question! 🧠✨",
        "Upload a file".bold(),
        "enter a website URL".bold(),
        "drop in a CSV".bold()
    );
    println!("🤖 Model: {}", model.cyan());
    println!();
}

pub fn print_input_types() {
    println!("Choose input type:");
    for (index, input_type) in InputType::ALL.iter().enumerate() {
        println!("  {}. {}", index + 1, input_type.label().bright_yellow());
    }
}

pub fn handle_command(input: &str) -> Result<ControlFlow<()>, String> {
    match input.to_lowercase().as_str() {
        "help" => {
            println!("\n📄 DocTalk Commands:");
            println!("  csv | pdf | website url   - Choose the input type (or 1, 2, 3)");
            println!("  <path to file>            - Upload a CSV or PDF file from disk");
            println!("  <url>                     - Enter a website URL");
            println!("  <your question>           - Ask about the loaded content");
            println!("  switch                    - Choose a different input type");
            println!("  help                      - Show this help menu");
            println!("  exit                      - Exit the program");
            println!();
            Ok(ControlFlow::Continue(()))
        }
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            Ok(ControlFlow::Break(()))
        }
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string()),
    }
}
