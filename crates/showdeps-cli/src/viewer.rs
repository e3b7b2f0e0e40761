use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use showdeps_core::{ShowdepsError, ShowdepsResult};

use crate::config::ViewerConfig;

/// How the artifact gets in front of the user on this platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerStrategy {
    /// Launch a lightweight viewer unless one is already running. The viewer
    /// reloads the file itself, so a second window would be a duplicate.
    SingleInstance { program: String, args: Vec<String> },
    /// Hand the file to the platform's default-association opener.
    DefaultOpen { program: String, args: Vec<String> },
    Unsupported { platform: String },
}

impl ViewerStrategy {
    /// Pick a strategy from a platform identifier (`std::env::consts::OS`).
    pub fn for_platform(os: &str, viewer: &ViewerConfig) -> Self {
        match os {
            "linux" => Self::SingleInstance {
                program: viewer.program.clone(),
                args: viewer.args.clone(),
            },
            "windows" => Self::DefaultOpen {
                program: "cmd".into(),
                args: vec!["/C".into(), "start".into(), String::new()],
            },
            "macos" => Self::DefaultOpen {
                program: "open".into(),
                args: Vec::new(),
            },
            other => Self::Unsupported {
                platform: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    Spawned,
    AlreadyRunning,
}

/// Process-table access and detached spawning.
pub trait ProcessHost {
    fn is_running(&self, name: &str) -> io::Result<bool>;
    /// Start `program` and return without waiting for it.
    fn spawn_detached(&self, program: &str, args: &[OsString]) -> io::Result<()>;
}

pub struct SystemProcesses;

impl ProcessHost for SystemProcesses {
    fn is_running(&self, name: &str) -> io::Result<bool> {
        let status = Command::new("pidof")
            .arg(name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status.success())
    }

    fn spawn_detached(&self, program: &str, args: &[OsString]) -> io::Result<()> {
        // The child is dropped, not waited on.
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

/// Show `artifact` using `strategy`.
///
/// The running check and the spawn are not atomic; two invocations in quick
/// succession can both start a viewer.
pub fn launch(
    strategy: &ViewerStrategy,
    host: &dyn ProcessHost,
    artifact: &Path,
) -> ShowdepsResult<LaunchOutcome> {
    match strategy {
        ViewerStrategy::SingleInstance { program, args } => {
            let running = host.is_running(program).unwrap_or_else(|e| {
                warn!("cannot query process table for {program}: {e}");
                false
            });
            if running {
                debug!("{program} already running");
                return Ok(LaunchOutcome::AlreadyRunning);
            }
            host.spawn_detached(program, &with_artifact(args, artifact))?;
            Ok(LaunchOutcome::Spawned)
        }
        ViewerStrategy::DefaultOpen { program, args } => {
            host.spawn_detached(program, &with_artifact(args, artifact))?;
            Ok(LaunchOutcome::Spawned)
        }
        ViewerStrategy::Unsupported { platform } => {
            Err(ShowdepsError::PlatformUnsupported(platform.clone()))
        }
    }
}

fn with_artifact(args: &[String], artifact: &Path) -> Vec<OsString> {
    let mut out: Vec<OsString> = args.iter().map(OsString::from).collect();
    out.push(artifact.as_os_str().to_os_string());
    out
}
