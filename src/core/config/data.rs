use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::completion::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::core::storage::FileStorage;
use crate::core::store::DEFAULT_CONVERSATION_KEY;

/// Which transcript renderer to use for printed and full-screen output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStyle {
    #[default]
    Styled,
    Plain,
}

impl TranscriptStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            TranscriptStyle::Styled => "styled",
            TranscriptStyle::Plain => "plain",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "styled" => Some(TranscriptStyle::Styled),
            "plain" => Some(TranscriptStyle::Plain),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Gemini model name (e.g., "gemini-1.5-flash-latest")
    pub model: Option<String>,
    /// API root; `models/<model>:generateContent` is appended to it
    pub base_url: Option<String>,
    /// Storage key of the conversation snapshot
    pub conversation_key: Option<String>,
    /// Directory holding conversation snapshots
    pub data_dir: Option<PathBuf>,
    pub transcript_style: Option<TranscriptStyle>,
}

impl Config {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn conversation_key(&self) -> &str {
        self.conversation_key
            .as_deref()
            .unwrap_or(DEFAULT_CONVERSATION_KEY)
    }

    pub fn transcript_style(&self) -> TranscriptStyle {
        self.transcript_style.unwrap_or_default()
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(FileStorage::default_dir)
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
