use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use megadl::core::backend::StorageBackend;
use megadl::core::backend::simulated::SimulatedBackend;
use megadl::core::notifications::{self, NotifyEvent};
use megadl::core::{DownloadResult, Downloader};
use megadl::display::{ConsoleDisplay, StatusDisplay};
use megadl::{config, context, logging};
use serde::Serialize;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "megadl")]
#[command(about = "MEGA share link downloader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the file or folder behind a share link
    Get(GetArgs),
}

#[derive(Args, Serialize)]
struct GetArgs {
    /// MEGA file or folder share link
    #[serde(skip)]
    url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    download_directory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    simulation: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long)]
    verbose: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Get(args) => run_get(args).await.context("Failed to run download")?,
    }

    Ok(())
}

async fn run_get(args: GetArgs) -> Result<()> {
    let config = config::AppConfig::new(Some(&args))?;
    logging::init(logging::LogConfig {
        json: false,
        verbose: config.verbose,
    });

    let notifier = notifications::create_notifier(&config.notifications);
    if let Some(notifier) = &notifier {
        if let Err(error) = notifier
            .notify(NotifyEvent::Startup {
                started_at: chrono::Utc::now(),
            })
            .await
        {
            tracing::warn!(%error, "startup notification was not delivered");
        }
    }

    let backend: Arc<dyn StorageBackend> = if config.simulation {
        Arc::new(SimulatedBackend::demo())
    } else {
        // The real client plugs in behind core::backend::StorageBackend.
        bail!("no storage client is integrated in this build; pass --simulation true to exercise the pipeline");
    };

    let ctx = context::AppContext::new(config, notifier);
    let downloader = Downloader::new(ctx, backend);
    let display: Arc<dyn StatusDisplay> = Arc::new(ConsoleDisplay);

    match downloader.download(&args.url, &display).await {
        Some(DownloadResult::File(path)) => {
            println!("Saved file to {}", path.display());
            Ok(())
        }
        Some(DownloadResult::Folder { path, downloaded }) => {
            println!("Saved {downloaded} file(s) to {}", path.display());
            Ok(())
        }
        // The failure was already shown on the display.
        None => std::process::exit(1),
    }
}
