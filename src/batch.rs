use std::{path::PathBuf, sync::Arc};

use log::{error, info};
use tokio::task::JoinSet;

use crate::{
    engine::{Engine, RunInputs, Score},
    error::Error,
    runtime::Runtime,
    settle::settle_all,
};

/// Outcome of one configuration
#[derive(Debug)]
pub struct RunResult {
    pub config: PathBuf,
    pub outcome: Result<Score, Error>,
}

/// Runs the engine once per configuration, concurrently.
/// All runs settle, whatever their outcome: one failure does not interrupt the others.
/// Results are returned in configuration order.
pub async fn run_batch(
    runtime: &Runtime,
    engine: &Engine,
    inputs: RunInputs,
    configs: &[PathBuf],
) -> Vec<RunResult> {
    let engine = Arc::new(engine.clone());
    let inputs = Arc::new(inputs);

    let mut tasks = JoinSet::new();

    for (index, config) in configs.iter().enumerate() {
        let engine = engine.clone();
        let inputs = inputs.clone();
        let config = config.clone();
        let solutions = runtime.solutions_path(&config);

        tasks.spawn(async move {
            info!("{} - deployed", config.display());
            (index, engine.run(&inputs, &config, &solutions).await)
        });
    }

    settle_all(tasks, configs.len())
        .await
        .into_iter()
        .zip(configs.iter())
        .map(|(outcome, config)| {
            if let Err(e) = &outcome {
                error!("{} - {}", config.display(), e);
            }
            RunResult {
                config: config.clone(),
                outcome,
            }
        })
        .collect()
}
