use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, info};

use showdeps_core::{Query, Renderer, ShowdepsError, ShowdepsResult};

pub const RENDER_CMD_ENV: &str = "SHOWDEPS_RENDER_CMD";
const DEFAULT_RENDERER: &str = "graphdeps";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Renderer backed by an external program (graphdeps by default).
///
/// Invoked as `<cmd...> --format <fmt> --output <path> [--verbose] -- <tokens...>`.
pub struct CommandRenderer {
    command: Vec<String>,
    format: ImageFormat,
}

impl CommandRenderer {
    pub fn new(command: Vec<String>, format: ImageFormat) -> ShowdepsResult<Self> {
        if command.is_empty() {
            return Err(ShowdepsError::Render("empty renderer command".into()));
        }
        Ok(Self { command, format })
    }

    /// Resolve the renderer from config, then the environment, then `PATH`.
    pub fn resolve(
        configured: Option<&str>,
        format: ImageFormat,
        env_map: Option<HashMap<String, String>>,
    ) -> ShowdepsResult<Self> {
        let command = resolve_render_command(configured, env_map.as_ref())?;
        Self::new(command, format)
    }

    pub fn argv(&self, query: &Query, output: &Path, verbose: bool) -> Vec<String> {
        let mut argv = self.command.clone();
        argv.push("--format".into());
        argv.push(self.format.to_string());
        argv.push("--output".into());
        argv.push(output.to_string_lossy().to_string());
        if verbose {
            argv.push("--verbose".into());
        }
        argv.push("--".into());
        argv.extend(query.tokens().iter().cloned());
        argv
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, query: &Query, output: &Path, verbose: bool) -> ShowdepsResult<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let argv = self.argv(query, output, verbose);
        debug!("render: {argv:?}");
        let result = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ShowdepsError::Render(format!("failed to spawn '{}': {e}", argv[0])))?;

        if verbose {
            let stdout = String::from_utf8_lossy(&result.stdout);
            for line in stdout.lines() {
                info!("{}: {line}", argv[0]);
            }
        }

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("'{}' exited with {}", argv[0], result.status)
            } else {
                stderr
            };
            return Err(ShowdepsError::Render(message));
        }
        Ok(())
    }
}

fn resolve_render_command(
    configured: Option<&str>,
    env_map: Option<&HashMap<String, String>>,
) -> ShowdepsResult<Vec<String>> {
    if let Some(cmd) = configured {
        return split_command(cmd);
    }

    let from_env = match env_map {
        Some(map) => map.get(RENDER_CMD_ENV).cloned(),
        None => env::var(RENDER_CMD_ENV).ok(),
    };
    if let Some(cmd) = from_env {
        return split_command(&cmd);
    }

    match which::which(DEFAULT_RENDERER) {
        Ok(path) => Ok(vec![path.to_string_lossy().to_string()]),
        Err(_) => Err(ShowdepsError::Render(format!(
            "{DEFAULT_RENDERER} not found. Set [render].command or {RENDER_CMD_ENV}, or install {DEFAULT_RENDERER}."
        ))),
    }
}

fn split_command(cmd: &str) -> ShowdepsResult<Vec<String>> {
    let parts = shell_words::split(cmd)
        .map_err(|e| ShowdepsError::Render(format!("invalid renderer command '{cmd}': {e}")))?;
    if parts.is_empty() {
        return Err(ShowdepsError::Render("empty renderer command".into()));
    }
    Ok(parts)
}

/// Append the format's extension when `path` has none.
pub fn with_format_extension(path: PathBuf, format: ImageFormat) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(format.extension())
    }
}
