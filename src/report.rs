use std::fs;
use std::io;
use std::path::Path;

use crate::config::prompt::UiMessages;
use crate::llm::chat::ChatError;

/// Heading followed by the model's markdown, untouched.
pub fn render_report(messages: &UiMessages, text: &str) -> String {
    format!("# {}\n\n{}\n", messages.report_title, text.trim_end())
}

/// Single line shown to the user when a request fails.
pub fn render_chat_error(messages: &UiMessages, err: &ChatError) -> String {
    match err {
        ChatError::MissingCredential => messages.missing_credential.clone(),
        other => format!("{}: {}", messages.api_error, other),
    }
}

pub fn write_report<P: AsRef<Path>>(path: P, report: &str) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report)
}
