pub mod answer;
pub mod prompt;

pub use answer::generate;
pub use prompt::format;
