#![doc(
    html_logo_url = "https://raw.githubusercontent.com/nav-solutions/.github/master/logos/logo2.jpg"
)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * UBX2RTK is part of the nav-solutions framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al,
 * (cf. https://github.com/nav-solutions/ubx2rtk/graphs/contributors)
 * This framework is shipped under Mozilla Public V2 license.
 *
 * Documentation: https://github.com/nav-solutions/ubx2rtk
 */

use env_logger::{Builder, Target};

use log::{error, info};

use reqwest::Client;

mod archive;
mod batch;
mod cli;
mod converter;
mod engine;
mod error;
mod fetcher;
mod report;
mod runtime;
mod selector;
mod settle;
mod utils;
mod window;

#[cfg(test)]
mod testing;

use crate::{
    archive::{Archive, Bev, Bkge, FileKind},
    batch::run_batch,
    cli::Cli,
    engine::{Engine, RunInputs},
    error::Error,
    fetcher::Fetcher,
    runtime::Runtime,
    selector::{BaseFiles, acquire},
    utils::discover_configs,
    window::TimeWindow,
};

/// Name of the JSON report, in the solutions directory
const JSON_REPORT: &str = "report.json";

/// Base station products, either user defined or downloaded
async fn base_files(cli: &Cli, runtime: &Runtime, window: TimeWindow) -> Result<BaseFiles, Error> {
    if let Some((obs, nav)) = cli.base_files() {
        info!("using base station files {} {:?}", obs.display(), nav);
        return Ok(BaseFiles {
            obs: vec![obs],
            nav,
        });
    }

    let settings = &runtime.settings;

    let client = Client::builder()
        .connect_timeout(settings.network_timeout)
        .build()?;

    let fetcher = Fetcher::new(client.clone(), &runtime.workdir, settings.network_timeout);

    info!(
        "{} - acquiring {} base station data for {}",
        settings.archive, settings.station, window
    );

    match settings.archive {
        Archive::Bev => {
            let provider = Bev::new(client, Cli::archive_root(settings), settings.network_timeout);
            acquire(&provider, &fetcher, &settings.station, window, settings.span_policy).await
        },
        Archive::Bkge => {
            acquire(&Bkge, &fetcher, &settings.station, window, settings.span_policy).await
        },
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let settings = cli.settings()?;

    let rover_obs = if cli.rinex_input() {
        cli.input()
    } else {
        converter::convert(&settings.convbin, &cli.input(), settings.process_timeout)
            .await?
            .obs
    };

    let window = TimeWindow::from_file(&rover_obs)?;
    info!("rover observations {}: {}", rover_obs.display(), window);

    let runtime = Runtime::new(&rover_obs, settings);

    let base = base_files(&cli, &runtime, window).await?;

    let configs = discover_configs(&runtime.settings.config_dir)?;

    if configs.is_empty() {
        println!("no config files");
        return Ok(());
    }

    tokio::fs::create_dir_all(&runtime.outdir).await?;

    let engine = Engine::new(
        runtime.settings.rnx2rtkp.clone(),
        runtime.settings.process_timeout,
    )
    .with_exporter(runtime.settings.pos2kml.clone());

    // acquisition guarantees at least one of each
    let base_obs = base
        .obs
        .first()
        .cloned()
        .ok_or(Error::NoBaseFiles(FileKind::Obs))?;

    let inputs = RunInputs {
        rover_obs,
        base_obs,
        base_nav: base.nav,
    };

    let results = run_batch(&runtime, &engine, inputs, &configs).await;

    report::print(&results);

    if runtime.settings.json {
        let path = runtime.outdir.join(JSON_REPORT);
        report::write_json(&results, &path)?;
        info!("report: {}", path.display());
    }

    Ok(())
}

#[tokio::main]
pub async fn main() {
    let mut builder = Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let cli = Cli::new();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
