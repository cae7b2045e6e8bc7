use crate::document::InputType;
use std::path::PathBuf;

/// Reads a file the user named at the prompt, standing in for a browser upload.
/// Only the extension matching the input type is accepted.
pub async fn read_upload(raw_path: &str, input_type: InputType) -> Result<Vec<u8>, String> {
    let expected = input_type
        .file_extension()
        .ok_or_else(|| format!("{} input does not take a file", input_type))?;

    // Paths dragged into a terminal often arrive quoted.
    let path = PathBuf::from(raw_path.trim().trim_matches(|c| c == '"' || c == '\''));

    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(expected));
    if !matches {
        return Err(format!("Please upload a .{} file", expected));
    }

    tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}
