mod config;
mod pipeline;
mod render;
mod task;
mod viewer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use showdeps_core::{CommandTable, ShowdepsError};
use showdeps_store::{FileQueryStore, RECORD_FILE_NAME};

use crate::config::Config;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::render::{with_format_extension, CommandRenderer, ImageFormat};
use crate::task::ProcessTaskRunner;
use crate::viewer::{launch, LaunchOutcome, SystemProcesses, ViewerStrategy};

const CACHE_DIR_NAME: &str = "taskwarrior-showdeps";
const SHOWN_IMAGE_STEM: &str = "last_deps_image";
const SAVED_IMAGE_STEM: &str = "deps";

#[derive(Parser)]
#[command(
    name = "showdeps",
    version,
    about = "Show dependency tree if report or update tree if command"
)]
struct Cli {
    /// Taskwarrior filters (a report) or a command with its arguments.
    /// Put filters starting with `-` after `--`
    args: Vec<String>,

    /// Output path; the format's extension is added when missing
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show the dependency tree in an image viewer instead of saving it to the current directory
    #[arg(long)]
    show: bool,

    /// Image format
    #[arg(long, value_enum)]
    format: Option<ImageFormat>,

    /// Render one tree per configured project, appending the project name to the output path
    #[arg(long)]
    all_projects: bool,

    /// Keep deleted tasks in the tree
    #[arg(long)]
    show_deleted: bool,

    /// Only render; do not pass the arguments to Taskwarrior
    #[arg(long)]
    no_task: bool,

    #[arg(short, long)]
    verbose: bool,

    /// Print the config file location and exit
    #[arg(long)]
    config_path: bool,
}

fn cache_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", CACHE_DIR_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".showdeps"))
}

fn record_path(config: &Config) -> PathBuf {
    config
        .store
        .path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| cache_dir().join(RECORD_FILE_NAME))
}

fn output_path(output: Option<PathBuf>, show: bool, format: ImageFormat) -> PathBuf {
    match output {
        Some(path) => with_format_extension(path, format),
        None if show => cache_dir().join(format!("{SHOWN_IMAGE_STEM}.{format}")),
        None => PathBuf::from(format!("{SAVED_IMAGE_STEM}.{format}")),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing_subscriber::filter::LevelFilter::INFO
    } else {
        tracing_subscriber::filter::LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.config_path {
        println!("{}", config::show_config_path());
        return Ok(());
    }

    let config = config::load_config()?;
    let format = cli.format.unwrap_or(config.render.format);
    let output = output_path(cli.output, cli.show, format);

    let store_path = record_path(&config);
    let store = FileQueryStore::new(&store_path)
        .with_context(|| format!("failed to open query record {}", store_path.display()))?;
    debug!("query record: {}", store.path().display());
    let renderer = CommandRenderer::resolve(config.render.command.as_deref(), format, None)?;
    let task = ProcessTaskRunner::new(config.task.program.clone());
    let table = CommandTable::taskwarrior();

    let pipeline = Pipeline {
        table: &table,
        store: &store,
        task: &task,
        renderer: &renderer,
    };
    let opts = PipelineOptions {
        output,
        show_deleted: cli.show_deleted || config.render.show_deleted,
        verbose: cli.verbose,
        run_task: config.task.enabled && !cli.no_task,
        projects: cli.all_projects.then(|| config.projects.names.clone()),
    };

    let summary = pipeline.run(&cli.args, &opts)?;
    debug!("{} -> query '{}'", summary.classification, summary.query);

    if cli.all_projects {
        if cli.show {
            warn!("--show is ignored with --all-projects");
        }
        for path in &summary.artifacts {
            println!("Image saved to {}", path.display());
        }
        return Ok(());
    }

    let Some(artifact) = summary.artifacts.first() else {
        return Ok(());
    };

    if !cli.show {
        println!("Image saved to {}", artifact.display());
        return Ok(());
    }

    let strategy = ViewerStrategy::for_platform(std::env::consts::OS, &config.viewer);
    match launch(&strategy, &SystemProcesses, artifact) {
        Ok(LaunchOutcome::Spawned) => info!("opened {}", artifact.display()),
        Ok(LaunchOutcome::AlreadyRunning) => info!("viewer already running"),
        Err(e @ ShowdepsError::PlatformUnsupported(_)) => eprintln!("{e}"),
        Err(e) => return Err(e).context("failed to open image viewer"),
    }
    Ok(())
}
