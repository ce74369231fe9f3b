use crate::domain::model::DownloadedFile;
use crate::domain::ports::{RecordingService, Storage};
use crate::utils::error::Result;

pub struct RecordingDownloader<S: RecordingService, St: Storage> {
    service: S,
    storage: St,
}

impl<S: RecordingService, St: Storage> RecordingDownloader<S, St> {
    pub fn new(service: S, storage: St) -> Self {
        Self { service, storage }
    }

    /// Fetches a fresh ticket, then streams the recording into storage.
    pub async fn download(&self, recording_id: &str) -> Result<DownloadedFile> {
        tracing::debug!("Requesting recording ticket");
        let ticket = self.service.meeting_ticket().await?;

        tracing::debug!("Requesting recording {}", recording_id);
        let file = self
            .service
            .download_recording(recording_id, &ticket, &self.storage)
            .await?;

        match file.info.declared_size {
            Some(declared) if declared != file.bytes_written => tracing::warn!(
                "⚠️ {} declared {} bytes but {} were written",
                file.info.name,
                declared,
                file.bytes_written
            ),
            _ => {}
        }

        tracing::info!(
            "📁 Saved {} ({} bytes) to {}",
            file.info.name,
            file.bytes_written,
            file.path.display()
        );
        Ok(file)
    }
}
