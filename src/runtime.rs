use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::process::Command;

use crate::{archive::Archive, selector::SpanPolicy};

/// External program
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub program: String,
    /// Leading arguments, passed before the call specific ones
    pub args: Vec<String>,
}

impl Tool {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Prepares a new invocation
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

/// User settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base station identifier
    pub station: String,
    /// Base station archive
    pub archive: Archive,
    /// Custom archive root URL
    pub archive_url: Option<String>,
    /// Directory containing the positioning configurations
    pub config_dir: PathBuf,
    /// Day boundary policy
    pub span_policy: SpanPolicy,
    /// Listing & download timeout
    pub network_timeout: Duration,
    /// Format converter & positioning engine timeout
    pub process_timeout: Duration,
    /// Format converter
    pub convbin: Tool,
    /// Positioning engine
    pub rnx2rtkp: Tool,
    /// Trajectory exporter, when KML export is requested
    pub pos2kml: Option<Tool>,
    /// Generate a JSON report
    pub json: bool,
}

/// Context of one execution, threaded through all stages.
#[derive(Debug, Clone)]
pub struct Runtime {
    /// Working directory, where base station products are stored
    pub workdir: PathBuf,
    /// Solutions directory
    pub outdir: PathBuf,
    pub settings: Settings,
}

impl Runtime {
    /// Builds the [Runtime] next to the rover observations.
    pub fn new(rover_obs: &Path, settings: Settings) -> Self {
        let workdir = match rover_obs.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self {
            outdir: workdir.join("out"),
            workdir,
            settings,
        }
    }

    /// Solution file of this configuration
    pub fn solutions_path(&self, config: &Path) -> PathBuf {
        let name = config
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "solutions".to_string());

        self.outdir.join(format!("{}.pos", name))
    }
}
