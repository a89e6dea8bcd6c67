//! Presentation adapters.
//!
//! - [`transcript`]: interchangeable renderers turning the message list into
//!   display lines.
//! - [`chat_loop`]: the full-screen interactive session.
//! - [`theme`]: style palette shared by both.

pub mod chat_loop;
pub mod theme;
pub mod transcript;
