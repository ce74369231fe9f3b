use clap::Parser;
use webex_recordings::app::{download_command, list_command};
use webex_recordings::config::toml_config::FileConfig;
use webex_recordings::config::Command;
use webex_recordings::utils::{logger, validation::Validate};
use webex_recordings::{CliConfig, Result, WtError};

async fn run(config: CliConfig) -> Result<()> {
    let file_config = match &config.config {
        Some(path) => {
            let file_config = FileConfig::from_file(path)?;
            file_config.validate()?;
            tracing::debug!("Loaded config file {}", path.display());
            Some(file_config)
        }
        None => None,
    };

    match &config.command {
        Command::Version => {
            println!("wt v{}", env!("CARGO_PKG_VERSION"));
        }
        Command::List(args) => {
            let stdout = std::io::stdout();
            let count = list_command(args, file_config.as_ref(), stdout.lock()).await?;
            tracing::debug!("Listed {} recording(s)", count);
        }
        Command::Download(args) => {
            let file = download_command(args, file_config.as_ref()).await?;
            println!("✅ Downloaded {} to {}", file.info.name, file.path.display());
        }
    }

    Ok(())
}

fn report_failure(e: &WtError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ wt failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if let Err(e) = run(config).await {
        report_failure(&e);
        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}
