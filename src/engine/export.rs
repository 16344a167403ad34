use std::{path::Path, process::Stdio};

use log::{debug, warn};

use crate::runtime::Tool;

/// Converts a solution file to KML, in the background.
/// The exporter process outlives this call and is never awaited by the caller:
/// its completion is only logged.
pub fn spawn_export(exporter: &Tool, solutions: &Path) {
    let mut command = exporter.command();

    command
        .arg("-ag")
        .arg(solutions)
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let solutions = solutions.display().to_string();

    match command.spawn() {
        Ok(mut child) => {
            tokio::spawn(async move {
                match child.wait().await {
                    Ok(status) if status.success() => {
                        debug!("{} - trajectory exported", solutions);
                    },
                    Ok(status) => {
                        warn!("{} - trajectory export failed: {}", solutions, status);
                    },
                    Err(e) => {
                        warn!("{} - trajectory export error: {}", solutions, e);
                    },
                }
            });
        },
        Err(e) => {
            warn!(
                "{} - failed to start {}: {}",
                solutions, exporter.program, e
            );
        },
    }
}
