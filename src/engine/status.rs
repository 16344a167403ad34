use std::path::Path;

use log::trace;
use serde::Serialize;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};

use crate::error::Error;

/// Clock record tag, in solution status files
const CLOCK_RECORD: &str = "$CLK";

/// Solution status code, as reported by the positioning engine
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolutionStatus {
    Fix = 1,
    Float = 2,
    Sbas = 3,
    Dgps = 4,
    Single = 5,
    Ppp = 6,
}

impl SolutionStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Fix),
            2 => Some(Self::Float),
            3 => Some(Self::Sbas),
            4 => Some(Self::Dgps),
            5 => Some(Self::Single),
            6 => Some(Self::Ppp),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        *self as usize - 1
    }
}

/// Number of epochs per [SolutionStatus]
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize)]
pub struct StatusHistogram {
    /// fix, float, sbas, dgps, single, ppp
    counts: [u64; 6],
}

/// Fix / (Fix + Float) ratio
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FixRatio {
    /// Percentage
    Defined(f64),
    /// Neither fix nor float epoch
    Undefined,
}

impl std::fmt::Display for FixRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defined(percent) => write!(f, "{:.1}%", percent),
            Self::Undefined => write!(f, "undefined ratio (no fix/float epochs)"),
        }
    }
}

impl FixRatio {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Defined(percent) => Some(*percent),
            Self::Undefined => None,
        }
    }
}

impl StatusHistogram {
    pub fn increment(&mut self, status: SolutionStatus) {
        self.counts[status.index()] += 1;
    }

    pub fn count(&self, status: SolutionStatus) -> u64 {
        self.counts[status.index()]
    }

    pub fn counts(&self) -> [u64; 6] {
        self.counts
    }

    /// Total number of epochs
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Latches one line of a solution status file.
    /// Only clock records contribute: the status is the 4th field.
    pub fn latch_line(&mut self, line: &str) {
        if !line.starts_with(CLOCK_RECORD) {
            return;
        }

        let status = line
            .split(',')
            .nth(3)
            .and_then(|field| field.trim().parse::<u8>().ok())
            .and_then(SolutionStatus::from_code);

        match status {
            Some(status) => self.increment(status),
            None => trace!("unresolved solution status: \"{}\"", line),
        }
    }

    pub fn fix_ratio(&self) -> FixRatio {
        let fix = self.count(SolutionStatus::Fix);
        let float = self.count(SolutionStatus::Float);

        if fix + float == 0 {
            FixRatio::Undefined
        } else {
            FixRatio::Defined(fix as f64 * 100.0 / (fix + float) as f64)
        }
    }

    /// Scans a solution status file
    pub async fn from_file(path: &Path) -> Result<Self, Error> {
        let fd = match File::open(path).await {
            Ok(fd) => fd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingSidecarOutput(path.to_path_buf()));
            },
            Err(e) => return Err(e.into()),
        };

        let mut histogram = Self::default();
        let mut lines = BufReader::new(fd).lines();

        while let Some(line) = lines.next_line().await? {
            histogram.latch_line(&line);
        }

        Ok(histogram)
    }
}
