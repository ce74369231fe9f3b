use crate::core::window::{format_wire_time, split_windows};
use crate::domain::model::{ListRequest, Recording};
use crate::domain::ports::RecordingService;
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use std::collections::HashSet;

/// 每頁上限，與服務端 listControl 的最大值一致
pub const PAGE_SIZE: u32 = 500;

/// Collects every recording created in a time range, one window and one page
/// at a time.
pub struct RecordingLister<S: RecordingService> {
    service: S,
}

impl<S: RecordingService> RecordingLister<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn list(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        host_webex_id: Option<&str>,
    ) -> Result<Vec<Recording>> {
        let windows = split_windows(start, end);
        tracing::debug!(
            "Listing recordings in {} window(s) between {} and {}",
            windows.len(),
            format_wire_time(&start),
            format_wire_time(&end)
        );

        let mut seen = HashSet::new();
        let mut recordings = Vec::new();

        for window in windows {
            let mut start_from = 0;
            let mut collected: u32 = 0;

            loop {
                let request = ListRequest {
                    window,
                    host_webex_id: host_webex_id.map(str::to_string),
                    start_from,
                    maximum_num: PAGE_SIZE,
                };
                let page = self.service.list_recordings(&request).await?;
                let returned = page.recordings.len() as u32;
                collected = collected.saturating_add(returned);

                tracing::debug!(
                    "Window {} - {}: got {} of {} (startFrom {})",
                    format_wire_time(&window.start),
                    format_wire_time(&window.end),
                    returned,
                    page.matching.total,
                    page.matching.start_from
                );

                for recording in page.recordings {
                    // 相鄰窗口共用邊界時間，同一筆可能出現兩次
                    if seen.insert(recording.recording_id.clone()) {
                        recordings.push(recording);
                    }
                }

                if returned == 0 || collected >= page.matching.total {
                    break;
                }

                let base = if page.matching.start_from > 0 {
                    page.matching.start_from
                } else {
                    start_from
                };
                match base.checked_add(returned) {
                    Some(next) if next > start_from => start_from = next,
                    next => {
                        tracing::warn!(
                            "Paging made no progress past startFrom {} (next {:?}), stopping",
                            start_from,
                            next
                        );
                        break;
                    }
                }
            }
        }

        tracing::info!("Found {} recording(s)", recordings.len());
        Ok(recordings)
    }
}
