use crate::domain::model::{DownloadedFile, ListRequest, ListingPage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::File;

pub trait Storage: Send + Sync {
    /// Creates `name` for writing and returns where it landed.
    fn create_file(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<(PathBuf, File)>> + Send;
}

#[async_trait]
pub trait RecordingService: Send + Sync {
    async fn list_recordings(&self, request: &ListRequest) -> Result<ListingPage>;

    async fn meeting_ticket(&self) -> Result<String>;

    async fn download_recording<St: Storage>(
        &self,
        recording_id: &str,
        ticket: &str,
        storage: &St,
    ) -> Result<DownloadedFile>;
}
