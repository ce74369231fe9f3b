pub mod commands;

pub use commands::{download_command, list_command};
