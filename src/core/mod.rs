//! Conversation state, persistence and the remote completion call.

pub mod completion;
pub mod config;
pub mod format;
pub mod message;
pub mod session;
pub mod storage;
pub mod store;
