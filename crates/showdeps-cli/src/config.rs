//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$SHOWDEPS_CONFIG` environment variable
//! 2. `~/.config/showdeps/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::render::ImageFormat;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub task: TaskConfig,
    pub render: RenderConfig,
    pub viewer: ViewerConfig,
    pub projects: ProjectsConfig,
}

/// Query record settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Record path. Default: platform cache dir.
    pub path: Option<String>,
}

/// Task tool invocation.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub program: String,
    pub enabled: bool,
}

/// Graph renderer settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer command line, split with shell rules.
    pub command: Option<String>,
    pub format: ImageFormat,
    pub show_deleted: bool,
}

/// Single-instance image viewer (Linux).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub program: String,
    pub args: Vec<String>,
}

/// Projects rendered by `--all-projects`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectsConfig {
    pub names: Vec<String>,
}

// --- Defaults ---

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            program: "task".into(),
            enabled: true,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            program: "feh".into(),
            args: vec!["--auto-zoom".into()],
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("SHOWDEPS_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("showdeps")
            .join("config.toml")
    })
}

/// Show the active config path (for `showdeps --config-path`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
