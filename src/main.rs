use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_service::api::ApiServer;
use transcript_service::cli::{Cli, Commands, OutputFormat};
use transcript_service::config::Config;
use transcript_service::transcript::{self, TranscriptError, TranscriptResponse};
use transcript_service::fetchers::{TranscriptFetcher, UnavailableFetcher};
use transcript_service::{fetchers, output, utils};

const MISSING_ARGUMENT: &str = "videoId argument required";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet, cli.json_logs);

    let quiet = cli.quiet;

    match cli.command {
        Commands::Fetch {
            video_id,
            output,
            format,
            pretty,
        } => {
            let Some(video_id) = utils::resolve_video_id(video_id.as_deref()) else {
                let response: TranscriptResponse =
                    TranscriptError::missing_video_id(MISSING_ARGUMENT).into();
                output::print_to_console(&response, &OutputFormat::Json, pretty)?;
                std::process::exit(1);
            };

            // Config errors surface as a failed transcript on stdout
            let fetcher: Arc<dyn TranscriptFetcher> = match Config::load().await {
                Ok(config) => fetchers::build_fetcher(&config.fetcher),
                Err(e) => {
                    tracing::error!("Configuration unusable, fetching disabled: {:#}", e);
                    Arc::new(UnavailableFetcher)
                }
            };

            tracing::debug!("Fetching transcript for {} via {}", video_id, fetcher.name());

            let progress = spinner(quiet, &video_id);
            let response = transcript::normalize(&video_id, fetcher.as_ref()).await;
            progress.finish_and_clear();

            if let TranscriptResponse::Failure(err) = &response {
                tracing::warn!("Transcript fetch for {} failed: {}", video_id, err.error);
            }

            match output {
                Some(path) => {
                    output::save_to_file(&response, &path, &format, pretty).await?;
                    eprintln!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&response, &format, pretty)?;
                }
            }
        }
        Commands::Serve {
            host,
            port,
            function_only,
        } => {
            let mut config = Config::load_for_server().await?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let fetcher = fetchers::build_fetcher(&config.fetcher);
            if !fetcher.is_available() {
                tracing::warn!("Serving without a working fetcher; transcript requests will fail");
            }

            ApiServer::new(&config, fetcher)
                .function_only(function_only)
                .start()
                .await?;
        }
        Commands::Config { show: _, init } => {
            if init {
                let path = Config::default().save().await?;
                println!("Configuration written to: {}", path.display());
            } else {
                Config::load_for_server().await?.display();
            }
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout is reserved for command output
fn init_tracing(verbose: bool, quiet: bool, json: bool) {
    let default_filter = if verbose {
        "transcript_service=debug,tower_http=debug"
    } else if quiet {
        "transcript_service=error"
    } else {
        "transcript_service=info,tower_http=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn spinner(quiet: bool, video_id: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        progress.set_style(style);
    }
    progress.set_message(format!("Fetching transcript for {}...", video_id));
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
