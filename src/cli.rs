use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};

use crate::{
    archive::{Archive, bev::DEFAULT_ROOT},
    error::Error,
    runtime::{Settings, Tool},
    selector::SpanPolicy,
};

use std::{path::PathBuf, str::FromStr, time::Duration};

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

impl Cli {
    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: Self::command().get_matches(),
        }
    }

    fn command() -> Command {
        Command::new("ubx2rtk")
            .author("Guillaume W. Bres, <guillaume.bressaix@gmail.com>")
            .version(env!("CARGO_PKG_VERSION"))
            .about("U-Blox capture to RTK solutions, against a public base station")
            .color(ColorChoice::Always)
            .arg_required_else_help(true)
            .arg(
                Arg::new("input")
                    .value_name("FILENAME")
                    .required(true)
                    .help("U-Blox capture. Use --obs if this is already an Observation RINEX."),
            )
            .arg(
                Arg::new("obs")
                    .long("obs")
                    .action(ArgAction::SetTrue)
                    .help("Input file is a rover Observation RINEX: skips the format conversion."),
            )
            .next_help_heading("Base station")
            .arg(
                Arg::new("station")
                    .short('s')
                    .long("station")
                    .value_name("NAME")
                    .default_value("MAH100IRL")
                    .help("Base station (long) name, for example MAH100IRL"),
            )
            .arg(
                Arg::new("rinex")
                    .short('r')
                    .long("rinex")
                    .value_name("ARCHIVE")
                    .default_value("BEV")
                    .help("Base station archive: BEV or BKGE"),
            )
            .arg(
                Arg::new("archive-url")
                    .long("archive-url")
                    .value_name("URL")
                    .help("Custom archive root URL"),
            )
            .arg(
                Arg::new("baseobs")
                    .short('o')
                    .long("baseobs")
                    .value_name("FILENAME")
                    .requires("basenav")
                    .help("Use this base station Observation RINEX rather than downloading one. Requires --basenav."),
            )
            .arg(
                Arg::new("basenav")
                    .short('n')
                    .long("basenav")
                    .value_name("FILENAME")
                    .action(ArgAction::Append)
                    .requires("baseobs")
                    .help("Use this base station Navigation RINEX. Use as many as needed."),
            )
            .arg(
                Arg::new("span-fallback")
                    .long("span-fallback")
                    .action(ArgAction::SetTrue)
                    .help("When the capture crosses midnight (UTC), use the base station data of the first day,
rather than aborting. End of capture is then not covered by the base station."),
            )
            .next_help_heading("Positioning")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("DIRECTORY")
                    .default_value("./config/")
                    .help("Directory of positioning configurations (.conf). One solution per configuration."),
            )
            .arg(
                Arg::new("no-kml")
                    .long("no-kml")
                    .action(ArgAction::SetTrue)
                    .help("Do not export solutions to KML"),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Also write a JSON report in the solutions directory"),
            )
            .next_help_heading("Timeouts")
            .arg(
                Arg::new("timeout")
                    .long("timeout")
                    .value_name("SECONDS")
                    .value_parser(clap::value_parser!(u64))
                    .default_value("60")
                    .help("Archive listing and download timeout"),
            )
            .arg(
                Arg::new("engine-timeout")
                    .long("engine-timeout")
                    .value_name("SECONDS")
                    .value_parser(clap::value_parser!(u64))
                    .default_value("600")
                    .help("Format conversion and positioning timeout"),
            )
            .next_help_heading("External tools")
            .arg(
                Arg::new("convbin")
                    .long("convbin")
                    .value_name("PROGRAM")
                    .default_value("convbin")
                    .help("Format converter"),
            )
            .arg(
                Arg::new("rnx2rtkp")
                    .long("rnx2rtkp")
                    .value_name("PROGRAM")
                    .default_value("rnx2rtkp")
                    .help("Positioning engine"),
            )
            .arg(
                Arg::new("pos2kml")
                    .long("pos2kml")
                    .value_name("PROGRAM")
                    .default_value("pos2kml")
                    .help("Trajectory exporter"),
            )
    }

    /// Input file path
    pub fn input(&self) -> PathBuf {
        self.matches
            .get_one::<String>("input")
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    /// True if input is already an Observation RINEX
    pub fn rinex_input(&self) -> bool {
        self.matches.get_flag("obs")
    }

    /// User base station files, as (observation, navigation)
    pub fn base_files(&self) -> Option<(PathBuf, Vec<PathBuf>)> {
        let obs = self.matches.get_one::<String>("baseobs")?;
        let nav = self
            .matches
            .get_many::<String>("basenav")?
            .map(PathBuf::from)
            .collect::<Vec<_>>();

        if nav.is_empty() {
            None
        } else {
            Some((PathBuf::from(obs), nav))
        }
    }

    fn string(&self, key: &str) -> String {
        self.matches
            .get_one::<String>(key)
            .cloned()
            .unwrap_or_default()
    }

    fn seconds(&self, key: &str) -> Duration {
        Duration::from_secs(self.matches.get_one::<u64>(key).copied().unwrap_or_default())
    }

    pub fn settings(&self) -> Result<Settings, Error> {
        Ok(Settings {
            station: self.string("station"),
            archive: Archive::from_str(&self.string("rinex"))?,
            archive_url: self.matches.get_one::<String>("archive-url").cloned(),
            config_dir: PathBuf::from(self.string("config")),
            span_policy: if self.matches.get_flag("span-fallback") {
                SpanPolicy::BeginDay
            } else {
                SpanPolicy::Reject
            },
            network_timeout: self.seconds("timeout"),
            process_timeout: self.seconds("engine-timeout"),
            convbin: Tool::new(&self.string("convbin")),
            rnx2rtkp: Tool::new(&self.string("rnx2rtkp")),
            pos2kml: if self.matches.get_flag("no-kml") {
                None
            } else {
                Some(Tool::new(&self.string("pos2kml")))
            },
            json: self.matches.get_flag("json"),
        })
    }

    /// Archive root URL
    pub fn archive_root(settings: &Settings) -> &str {
        settings.archive_url.as_deref().unwrap_or(DEFAULT_ROOT)
    }
}
