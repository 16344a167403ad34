use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use hifitime::prelude::Epoch;
use log::debug;

use crate::error::Error;

const FIRST_OBS_MARKER: &str = "TIME OF FIRST OBS";
const LAST_OBS_MARKER: &str = "TIME OF LAST OBS";

/// Campaign bounds, both inclusive, expressed in UTC.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimeWindow {
    pub begin: Epoch,
    pub end: Epoch,
}

/// How much calendar time a [TimeWindow] covers
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Span {
    /// begin and end share the same UTC hour
    Hour,
    /// begin and end share the same UTC day
    Day,
    /// day boundary is crossed
    MultiDay,
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} ; {}]", self.begin, self.end)
    }
}

impl TimeWindow {
    /// Reads the header of an Observation RINEX file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let fd = File::open(path)?;
        let window = Self::parse(BufReader::new(fd))?;
        debug!("{} - time window {}", path.display(), window);
        Ok(window)
    }

    /// Scans all lines until both time markers were found.
    /// Only the first occurrence of each marker is retained.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut begin = Option::<Epoch>::None;
        let mut end = Option::<Epoch>::None;

        for line in reader.lines() {
            let line = line?;

            if begin.is_none() && line.contains(FIRST_OBS_MARKER) {
                begin = Some(parse_time_of_obs(&line)?);
            } else if end.is_none() && line.contains(LAST_OBS_MARKER) {
                end = Some(parse_time_of_obs(&line)?);
            }

            if begin.is_some() && end.is_some() {
                break;
            }
        }

        match (begin, end) {
            (Some(begin), Some(end)) => {
                if end < begin {
                    return Err(Error::MalformedHeader(format!(
                        "last observation {} precedes first observation {}",
                        end, begin
                    )));
                }
                Ok(Self { begin, end })
            },
            (None, _) => Err(Error::MalformedHeader(format!(
                "missing \"{}\"",
                FIRST_OBS_MARKER
            ))),
            (_, None) => Err(Error::MalformedHeader(format!(
                "missing \"{}\"",
                LAST_OBS_MARKER
            ))),
        }
    }

    /// Classifies this window, in UTC.
    pub fn span(&self) -> Span {
        let (y0, m0, d0, h0, _, _, _) = self.begin.to_gregorian_utc();
        let (y1, m1, d1, h1, _, _, _) = self.end.to_gregorian_utc();

        if (y0, m0, d0) != (y1, m1, d1) {
            Span::MultiDay
        } else if h0 != h1 {
            Span::Day
        } else {
            Span::Hour
        }
    }
}

/// Parses "YYYY MM DD hh mm ss[.sssssss]" leading fields.
fn parse_time_of_obs(line: &str) -> Result<Epoch, Error> {
    let malformed = || Error::MalformedHeader(format!("invalid time of obs: \"{}\"", line.trim()));

    let fields = line.split_whitespace().take(6).collect::<Vec<_>>();
    if fields.len() < 6 {
        return Err(malformed());
    }

    let year = fields[0].parse::<i32>().map_err(|_| malformed())?;
    let month = fields[1].parse::<u8>().map_err(|_| malformed())?;
    let day = fields[2].parse::<u8>().map_err(|_| malformed())?;
    let hour = fields[3].parse::<u8>().map_err(|_| malformed())?;
    let minute = fields[4].parse::<u8>().map_err(|_| malformed())?;

    // RINEX writes seconds with 7 decimals
    let (second, nanos) = match fields[5].parse::<u8>() {
        Ok(second) => (second, 0),
        Err(_) => {
            let seconds = fields[5].parse::<f64>().map_err(|_| malformed())?;
            if !(0.0..61.0).contains(&seconds) {
                return Err(malformed());
            }
            let whole = seconds.trunc();
            (whole as u8, ((seconds - whole) * 1.0E9).round() as u32)
        },
    };

    if !(1..=12).contains(&month) {
        return Err(malformed());
    }

    Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, second, nanos)
        .map_err(|_| malformed())
}
