//! gemchat is a terminal chat client for the Gemini `generateContent` API.
//!
//! The crate is organized around a small set of layers:
//! - [`core`] owns the conversation: messages, the snapshot store, the
//!   remote completion call and the session state machine tying them
//!   together.
//! - [`ui`] renders the conversation and runs the full-screen loop.
//! - [`api`] defines the request/response payloads of the remote call.
//! - [`cli`] parses arguments and dispatches subcommands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
