use crate::adapters::WebexClient;
use crate::config::cli::LocalStorage;
use crate::config::settings::SiteSettings;
use crate::config::toml_config::FileConfig;
use crate::config::{DownloadArgs, ListArgs};
use crate::core::download::RecordingDownloader;
use crate::core::listing::RecordingLister;
use crate::core::report::write_recordings;
use crate::core::window::{date_range_bounds, year_bounds};
use crate::domain::model::DownloadedFile;
use crate::utils::error::Result;
use crate::utils::validation::{validate_numeric_id, validate_path, validate_range};
use chrono::{Datelike, NaiveDateTime, Utc};
use std::io::Write;

const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 9999;

/// Time range to list: `--from`/`--to` when given, otherwise the whole year.
fn listing_bounds(args: &ListArgs) -> Result<(NaiveDateTime, NaiveDateTime)> {
    match (args.from, args.to) {
        (Some(from), Some(to)) => {
            validate_range("from", from.year(), MIN_YEAR, MAX_YEAR)?;
            validate_range("to", to.year(), MIN_YEAR, MAX_YEAR)?;
            date_range_bounds(from, to)
        }
        _ => {
            let year = args.year.unwrap_or_else(|| Utc::now().year());
            validate_range("year", year, MIN_YEAR, MAX_YEAR)?;
            year_bounds(year)
        }
    }
}

/// Runs `list` and writes the report to `out`. Returns the number of
/// recordings written.
pub async fn list_command<W: Write>(
    args: &ListArgs,
    file: Option<&FileConfig>,
    out: W,
) -> Result<usize> {
    let (start, end) = listing_bounds(args)?;

    let settings = SiteSettings::resolve(&args.connection, None, file)?;
    tracing::debug!("Resolved settings: {:?}", settings);
    let credentials = settings.credentials()?;
    let client = WebexClient::new(
        settings.endpoints()?,
        credentials,
        settings.site_id.clone(),
        settings.http,
    )?;

    let lister = RecordingLister::new(client);
    let recordings = lister.list(start, end, args.userid.as_deref()).await?;

    write_recordings(out, &recordings, args.output_format())?;
    Ok(recordings.len())
}

pub async fn download_command(
    args: &DownloadArgs,
    file: Option<&FileConfig>,
) -> Result<DownloadedFile> {
    validate_numeric_id("recid", &args.recid)?;
    validate_path("output_dir", &args.output_dir.to_string_lossy())?;

    let settings = SiteSettings::resolve(&args.connection, args.domain.as_deref(), file)?;
    settings.require_nbr_domain()?;
    tracing::debug!("Resolved settings: {:?}", settings);
    let credentials = settings.credentials()?;
    let client = WebexClient::new(
        settings.endpoints()?,
        credentials,
        settings.site_id.clone(),
        settings.http,
    )?;

    let storage = LocalStorage::new(args.output_dir.clone());
    let downloader = RecordingDownloader::new(client, storage);
    downloader.download(&args.recid).await
}
