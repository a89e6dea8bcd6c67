pub mod data;
pub mod io;
pub mod printing;


pub use data::{Config, TranscriptStyle};
pub use io::ConfigError;
