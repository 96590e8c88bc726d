//! Classify video files on a kinoknecht server from the command line.

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use kinoknecht_client::{
    ApiClient, CatalogController, ConfigLoader, ConfigOverrides, LinkReport,
    SearchKind,
};
use kinoknecht_model::{ImdbId, ShowId, VideoFileId};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::ConsoleView;

#[derive(Parser)]
#[command(
    name = "kinoctl",
    version,
    about = "Turn loose video files into movies, shows and episodes"
)]
struct Cli {
    /// Server script root, e.g. http://localhost:6600
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Environment file loaded before reading KINOKNECHT_* variables
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the title guess for a video file
    Suggest { vfid: VideoFileId },
    /// Search the external movie catalog
    SearchMovie { query: String },
    /// Search shows known to the server
    SearchShow { query: String },
    /// Create a movie from video files and a catalog id
    CreateMovie {
        /// IMDb id, with or without the tt prefix
        #[arg(long)]
        imdb: ImdbId,
        #[arg(required = true)]
        vfids: Vec<VideoFileId>,
    },
    /// Create a show and one episode per video file
    CreateShow {
        title: String,
        #[arg(required = true)]
        vfids: Vec<VideoFileId>,
    },
    /// Add video files as episodes of an existing show
    AddToShow {
        show_id: ShowId,
        #[arg(required = true)]
        vfids: Vec<VideoFileId>,
    },
}

type Controller = CatalogController<ApiClient, ConsoleView>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let controller = build_controller(&cli)?;

    match cli.command {
        Command::Suggest { vfid } => {
            controller.capture_single_selection(vfid.clone());
            controller
                .fetch_suggested_title(&vfid)
                .await
                .with_context(|| format!("no title suggestion for {vfid}"))?;
        }
        Command::SearchMovie { query } => {
            controller
                .search_external_catalog(&query, SearchKind::Movies)
                .await
                .context("movie search failed")?;
        }
        Command::SearchShow { query } => {
            controller
                .search_external_catalog(&query, SearchKind::Shows)
                .await
                .context("show search failed")?;
        }
        Command::CreateMovie { imdb, vfids } => {
            select_all(&controller, vfids);
            let movie = controller
                .create_from_catalog_match(imdb)
                .await
                .context("movie creation failed")?;
            info!("Movie {} created", movie);
        }
        Command::CreateShow { title, vfids } => {
            select_all(&controller, vfids);
            let report = controller
                .create_show_then_link_episodes(&title)
                .await
                .context("show creation failed")?;
            check_report(&report)?;
        }
        Command::AddToShow { show_id, vfids } => {
            select_all(&controller, vfids);
            let report = controller
                .link_selection_to_show(show_id)
                .await
                .context("linking episodes failed")?;
            check_report(&report)?;
        }
    }

    controller.tracker().wait_idle().await;
    Ok(())
}

fn build_controller(cli: &Cli) -> Result<Controller> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &cli.env_file {
        loader = loader.with_env_file(path);
    }
    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        timeout_secs: cli.timeout,
    };
    let load = loader
        .load(&overrides)
        .context("failed to load client configuration")?;
    match &load.metadata.config_path {
        Some(path) => debug!("Configuration read from {}", path.display()),
        None => debug!("No configuration file, using defaults"),
    }
    if load.metadata.env_file_loaded {
        debug!("Environment file loaded");
    }
    info!("Using server {}", load.config.base_url);

    let api = ApiClient::new(&load.config)?;
    let view = ConsoleView::new(load.config.base_url.clone());
    Ok(CatalogController::new(Arc::new(api), Arc::new(view)))
}

fn select_all(controller: &Controller, vfids: Vec<VideoFileId>) {
    controller.set_files(vfids);
    controller.toggle_select_all(true);
    controller.capture_selection_from_checked();
}

fn check_report(report: &LinkReport) -> Result<()> {
    for linked in &report.linked {
        info!("{} -> episode {}", linked.file, linked.episode);
    }
    for failed in &report.failed {
        eprintln!("{}: {}", failed.file, failed.error);
    }
    if !report.is_complete() {
        bail!(
            "{} of {} video files were not linked to show {}",
            report.failed.len(),
            report.failed.len() + report.linked.len(),
            report.show_id
        );
    }
    Ok(())
}
