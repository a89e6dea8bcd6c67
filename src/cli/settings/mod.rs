//! `gemchat set` / `gemchat unset`.
//!
//! Each function mutates a [`Config`] in place and returns the confirmation
//! line to print; persisting is left to the caller.

pub mod error;

use std::path::PathBuf;

use crate::core::config::{Config, TranscriptStyle};

pub use error::SettingError;

pub const SETTING_KEYS: &[&str] = &[
    "model",
    "base-url",
    "conversation",
    "data-dir",
    "transcript-style",
];

pub fn apply_set(config: &mut Config, key: &str, args: &[String]) -> Result<String, SettingError> {
    if !SETTING_KEYS.contains(&key) {
        return Err(SettingError::UnknownKey(key.to_string()));
    }

    let value = args.join(" ");
    let value = value.trim();
    if value.is_empty() {
        return Err(missing_value(key));
    }

    match key {
        "model" => config.model = Some(value.to_string()),
        "base-url" => config.base_url = Some(value.to_string()),
        "conversation" => config.conversation_key = Some(value.to_string()),
        "data-dir" => config.data_dir = Some(PathBuf::from(value)),
        "transcript-style" => {
            let style = TranscriptStyle::parse(value)
                .ok_or_else(|| SettingError::UnknownStyle(value.to_string()))?;
            config.transcript_style = Some(style);
        }
        _ => unreachable!("key checked against SETTING_KEYS"),
    }

    Ok(format!("✅ Set {key} to: {value}"))
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    match key {
        "model" => config.model = None,
        "base-url" => config.base_url = None,
        "conversation" => config.conversation_key = None,
        "data-dir" => config.data_dir = None,
        "transcript-style" => config.transcript_style = None,
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }

    Ok(format!("✅ Unset {key} (will use default)"))
}

fn missing_value(key: &str) -> SettingError {
    let (hint, example) = match key {
        "model" => (
            "To set a default model, provide the model name:",
            "gemchat set model gemini-1.5-pro",
        ),
        "base-url" => (
            "To set the API root, provide a URL:",
            "gemchat set base-url https://generativelanguage.googleapis.com/v1beta",
        ),
        "conversation" => (
            "To switch conversations, provide a key:",
            "gemchat set conversation work",
        ),
        "data-dir" => (
            "To move conversation storage, provide a directory:",
            "gemchat set data-dir ~/.local/share/gemchat",
        ),
        _ => (
            "To choose a transcript style, provide 'styled' or 'plain':",
            "gemchat set transcript-style plain",
        ),
    };
    SettingError::MissingArgs { hint, example }
}
