pub mod download;
pub mod listing;
pub mod report;
pub mod window;

pub use crate::domain::model::{DownloadedFile, Recording};
pub use crate::domain::ports::{RecordingService, Storage};
pub use crate::utils::error::Result;
