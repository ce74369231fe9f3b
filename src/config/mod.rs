pub mod cli;
pub mod settings;
pub mod toml_config;

use crate::core::report::OutputFormat;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "wt")]
#[command(version)]
#[command(about = "List and download meeting recordings of a hosted tenant")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines on stderr")]
    pub log_json: bool,

    #[arg(long, global = true, env = "WT_CONFIG", help = "TOML file with site, credential and endpoint settings")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List recordings of the tenant
    #[command(long_about = "The list command enables IT administrators to list recordings.")]
    List(ListArgs),
    /// Download one recording
    #[command(long_about = "The download command enables IT administrators to download recordings.")]
    Download(DownloadArgs),
    /// Print the version number of wt
    Version,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    #[arg(long, env = "WT_USERNAME", help = "admin username, i.e. bjones")]
    pub username: Option<String>,

    #[arg(long, env = "WT_PASSWORD", hide_env_values = true, help = "admin password")]
    pub password: Option<String>,

    #[arg(long, help = "tenant name without .webex.com, e.g. acme")]
    pub tenant: Option<String>,

    #[arg(long = "site", help = "site ID of the tenant, typically a six digit number")]
    pub site_id: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(short = 'y', long, help = "year to list (defaults to the current year)")]
    pub year: Option<i32>,

    #[arg(long, requires = "to", conflicts_with = "year", help = "first day to list, YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    #[arg(long, requires = "from", conflicts_with = "year", help = "last day to list, YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    #[arg(short = 'u', long, help = "only list recordings hosted by this user ID")]
    pub userid: Option<String>,

    #[arg(short = 'c', long, conflicts_with = "format", help = "output CSV instead of the table")]
    pub csv: bool,

    #[arg(long, value_enum, help = "output format")]
    pub format: Option<OutputFormat>,
}

impl ListArgs {
    pub fn output_format(&self) -> OutputFormat {
        if self.csv {
            OutputFormat::Csv
        } else {
            self.format.unwrap_or_default()
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(short = 'r', long, help = "ID of the recording to download")]
    pub recid: String,

    #[arg(long, help = "NBR domain without .webex.com")]
    pub domain: Option<String>,

    #[arg(short = 'o', long, default_value = ".", help = "directory to save the recording in")]
    pub output_dir: PathBuf,
}
