//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod history;
pub mod say;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::history::{run_clear, run_history};
use crate::cli::say::run_say;
use crate::cli::settings::{apply_set, apply_unset, SettingError};
use crate::core::completion::{GeminiClient, API_KEY_ENV};
use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::core::session::ChatSession;
use crate::core::storage::FileStorage;
use crate::core::store::ConversationStore;
use crate::ui::chat_loop::{run_chat, ChatContext};
use crate::ui::transcript::renderer_for;
use crate::utils::logging::{self, LogTarget};

#[derive(Parser)]
#[command(name = "gemchat", version)]
#[command(about = "A terminal chat interface for the Gemini API")]
#[command(
    long_about = "gemchat is a terminal chat interface that sends each message to the Gemini \
generateContent API and shows the reply. The conversation is saved after every message and \
restored on the next start.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (required for chat and say)\n\
  GEMCHAT_LOG       Log filter directives (e.g. debug, gemchat=trace)\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/PgUp/PgDn Scroll through the conversation\n\
  End               Jump back to the latest message\n\
  Ctrl+L            Clear the conversation\n\
  Ctrl+C / Esc      Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use instead of the configured one
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Conversation key to use instead of the configured one
    #[arg(short = 'c', long, global = true, value_name = "KEY")]
    pub conversation: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the full-screen chat interface (default)
    Chat,
    /// Send one message and print the reply
    Say {
        /// The message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Print the saved conversation
    History,
    /// Delete the saved conversation
    Clear,
    /// Set configuration values, or print them when no value is given
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat);

    let log_target = match command {
        Commands::Chat => LogTarget::FileOnly,
        _ => LogTarget::Stderr,
    };
    logging::init(log_target, args.log_file.as_deref())?;

    let config = Config::load()?;

    match command {
        Commands::Chat => {
            let session = open_session(&config, args.conversation.as_deref())?;
            let client = build_client(&config, args.model.as_deref(), require_api_key());
            let model = client.model().to_string();
            run_chat(ChatContext {
                session,
                client: Arc::new(client),
                renderer: renderer_for(config.transcript_style()),
                model,
            })
            .await
        }
        Commands::Say { prompt } => {
            let mut session = open_session(&config, args.conversation.as_deref())?;
            let client = build_client(&config, args.model.as_deref(), require_api_key());
            let renderer = renderer_for(config.transcript_style());
            run_say(&mut session, &client, renderer.as_ref(), &prompt.join(" ")).await
        }
        Commands::History => {
            let session = open_session(&config, args.conversation.as_deref())?;
            let renderer = renderer_for(config.transcript_style());
            run_history(&session, renderer.as_ref());
            Ok(())
        }
        Commands::Clear => {
            let mut session = open_session(&config, args.conversation.as_deref())?;
            run_clear(&mut session);
            Ok(())
        }
        Commands::Set { key, value } => {
            let value = value.unwrap_or_default();
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            let mut config = config;
            let result = apply_set(&mut config, &key, &value);
            finish_setting(&config, result);
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = config;
            let result = apply_unset(&mut config, &key);
            finish_setting(&config, result);
            Ok(())
        }
    }
}

/// Persist a changed configuration and report the outcome; exits non-zero on
/// failure.
fn finish_setting(config: &Config, result: Result<String, SettingError>) {
    let result = result.and_then(|message| {
        config
            .save()
            .map(|()| message)
            .map_err(|err| SettingError::ConfigError(err.to_string()))
    });

    match result {
        Ok(message) => println!("{message}"),
        Err(err) => {
            err.print();
            std::process::exit(1);
        }
    }
}

/// Open the conversation selected by `override_key` or the configuration.
pub fn open_session(
    config: &Config,
    override_key: Option<&str>,
) -> Result<ChatSession<FileStorage>, Box<dyn Error>> {
    let data_dir = config
        .data_dir()
        .ok_or("Failed to determine a data directory; set one with 'gemchat set data-dir <path>'")?;
    let key = override_key.unwrap_or_else(|| config.conversation_key());
    debug!(data_dir = %path_display(&data_dir), key, "opening conversation");

    let store = ConversationStore::new(FileStorage::new(data_dir), key);
    Ok(ChatSession::open(store))
}

fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

fn require_api_key() -> String {
    match api_key_from_env() {
        Some(key) => key,
        None => {
            eprintln!("❌ Error: {API_KEY_ENV} environment variable not set");
            eprintln!();
            eprintln!("Please set your Gemini API key:");
            eprintln!("export {API_KEY_ENV}=\"your-api-key-here\"");
            std::process::exit(1);
        }
    }
}

pub fn build_client(config: &Config, model_override: Option<&str>, api_key: String) -> GeminiClient {
    let model = model_override.unwrap_or_else(|| config.model());
    GeminiClient::new(config.base_url(), model, api_key)
}
