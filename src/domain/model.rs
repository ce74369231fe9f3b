use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry of a `LstRecording` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub recording_id: String,
    pub host_webex_id: String,
    pub name: String,
    pub create_time: String,
    pub time_zone_id: String,
    /// Size in MB as reported by the service.
    pub size: f64,
    pub stream_url: String,
    pub file_url: String,
    pub recording_type: i64,
    /// Duration in seconds.
    pub duration: i64,
    pub format: String,
    pub service_type: String,
    pub conf_id: String,
    pub password: String,
    pub password_req: String,
}

impl Recording {
    pub fn csv_headers() -> [&'static str; 14] {
        [
            "RecordingID",
            "HostWebExID",
            "RecordingName",
            "RecordingCreateTime",
            "RecordingSize",
            "StreamURL",
            "FileURL",
            "RecordingType",
            "Duration",
            "Format",
            "ServiceType",
            "ConfID",
            "Password",
            "PasswordReq",
        ]
    }

    pub fn to_csv_row(&self) -> [String; 14] {
        [
            self.recording_id.clone(),
            self.host_webex_id.clone(),
            self.name.clone(),
            self.create_time.clone(),
            format!("{:.3}", self.size),
            self.stream_url.clone(),
            self.file_url.clone(),
            self.recording_type.to_string(),
            self.duration.to_string(),
            self.format.clone(),
            self.service_type.clone(),
            self.conf_id.clone(),
            self.password.clone(),
            self.password_req.clone(),
        ]
    }
}

/// `header/response` of an XML service reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceHeader {
    pub result: String,
    pub gsb_status: String,
    pub reason: String,
    pub exception_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchingRecords {
    pub total: u32,
    pub returned: u32,
    pub start_from: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub header: ServiceHeader,
    pub matching: MatchingRecords,
    pub recordings: Vec<Recording>,
}

/// Creation-time range of a single list query. The service refuses ranges
/// longer than 28 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub window: DateWindow,
    pub host_webex_id: Option<String>,
    pub start_from: u32,
    pub maximum_num: u32,
}

/// Second part of a download reply: file name, then declared size, then
/// anything else the storage service appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFileInfo {
    pub name: String,
    pub declared_size: Option<u64>,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub info: EmbeddedFileInfo,
    pub bytes_written: u64,
}
