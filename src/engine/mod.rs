use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use log::{debug, info, warn};

use crate::{error::Error, runtime::Tool};

mod export;
pub mod status;

use export::spawn_export;
use status::{FixRatio, StatusHistogram};

/// Sidecar suffix of solution status files
const STATUS_SUFFIX: &str = ".stat";

/// Rover and base station inputs, shared by all runs
#[derive(Debug, Clone, PartialEq)]
pub struct RunInputs {
    pub rover_obs: PathBuf,
    pub base_obs: PathBuf,
    pub base_nav: Vec<PathBuf>,
}

/// Solution quality of one run
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Score {
    pub histogram: StatusHistogram,
    pub ratio: FixRatio,
}

/// Positioning engine
#[derive(Debug, Clone)]
pub struct Engine {
    tool: Tool,
    timeout: Duration,
    exporter: Option<Tool>,
}

/// Solution status file, next to the solutions
pub fn status_path(solutions: &Path) -> PathBuf {
    let mut path = solutions.as_os_str().to_os_string();
    path.push(STATUS_SUFFIX);
    PathBuf::from(path)
}

impl Engine {
    pub fn new(tool: Tool, timeout: Duration) -> Self {
        Self {
            tool,
            timeout,
            exporter: None,
        }
    }

    /// Export every solution file to KML with this exporter
    pub fn with_exporter(mut self, exporter: Option<Tool>) -> Self {
        self.exporter = exporter;
        self
    }

    /// Runs the engine with this configuration and scores its solutions.
    /// An undefined ratio is a valid outcome.
    pub async fn run(&self, inputs: &RunInputs, config: &Path, solutions: &Path) -> Result<Score, Error> {
        let status_file = status_path(solutions);

        // so a previous run can't be scored
        match tokio::fs::remove_file(&status_file).await {
            Ok(()) => debug!("{} - removed stale {}", config.display(), status_file.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => return Err(e.into()),
        }

        let mut command = self.tool.command();

        // -x: trace level (off)
        // -y: solution status level (states)
        // -k: configuration file
        command
            .args(["-x", "0", "-y", "1", "-k"])
            .arg(config)
            .arg("-o")
            .arg(solutions)
            .arg(&inputs.rover_obs)
            .arg(&inputs.base_obs)
            .args(&inputs.base_nav)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!("{} - {:?}", config.display(), command);

        let mut child = command.spawn().map_err(|source| Error::EngineInvocation {
            program: self.tool.program.clone(),
            source,
        })?;

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                let _ = child.kill().await;
                return Err(Error::Timeout {
                    task: format!("{} {}", self.tool.program, config.display()),
                    after: self.timeout,
                });
            },
        };

        if !status.success() {
            warn!("{} - {} exited with {}", config.display(), self.tool.program, status);
        }

        let histogram = StatusHistogram::from_file(&status_file).await?;
        let ratio = histogram.fix_ratio();

        info!(
            "{} - {} epochs {:?} - {}",
            config.display(),
            histogram.total(),
            histogram.counts(),
            ratio
        );

        if let Some(exporter) = &self.exporter {
            spawn_export(exporter, solutions);
        }

        Ok(Score { histogram, ratio })
    }
}
