pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{Credentials, Endpoints, HttpOptions, WebexClient};
pub use config::{cli::LocalStorage, CliConfig};
pub use core::{download::RecordingDownloader, listing::RecordingLister};
pub use utils::error::{Result, WtError};
