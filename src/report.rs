use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{batch::RunResult, engine::status::FixRatio, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Undefined,
    Failed,
}

/// One report line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub config: String,
    pub status: Status,
    /// Fix ratio, in %
    pub fix_ratio: Option<f64>,
    /// fix, float, sbas, dgps, single, ppp epochs
    pub histogram: Option<[u64; 6]>,
    pub error: Option<String>,
}

impl From<&RunResult> for Entry {
    fn from(result: &RunResult) -> Self {
        let config = result.config.display().to_string();

        match &result.outcome {
            Ok(score) => Self {
                config,
                status: match score.ratio {
                    FixRatio::Defined(_) => Status::Ok,
                    FixRatio::Undefined => Status::Undefined,
                },
                fix_ratio: score.ratio.percent(),
                histogram: Some(score.histogram.counts()),
                error: None,
            },
            Err(e) => Self {
                config,
                status: Status::Failed,
                fix_ratio: None,
                histogram: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Human readable outcome of one configuration
pub fn describe(result: &RunResult) -> String {
    match &result.outcome {
        Ok(score) => format!("{} returned {}", result.config.display(), score.ratio),
        Err(e) => format!("{} failed: {}", result.config.display(), e),
    }
}

/// Prints every outcome, one per line
pub fn print(results: &[RunResult]) {
    for result in results.iter() {
        println!("{}", describe(result));
    }
}

/// Writes a JSON report
pub fn write_json(results: &[RunResult], path: &Path) -> Result<(), Error> {
    let entries = results.iter().map(Entry::from).collect::<Vec<_>>();
    let mut fd = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut fd, &entries)?;
    fd.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{Entry, Status, describe, write_json};
    use crate::{
        batch::RunResult,
        engine::{
            Score,
            status::{SolutionStatus, StatusHistogram},
        },
        error::Error,
    };
    use std::path::PathBuf;

    fn results() -> Vec<RunResult> {
        let mut histogram = StatusHistogram::default();
        for _ in 0..8 {
            histogram.increment(SolutionStatus::Fix);
        }
        for _ in 0..2 {
            histogram.increment(SolutionStatus::Float);
        }

        vec![
            RunResult {
                config: PathBuf::from("config/a.conf"),
                outcome: Ok(Score {
                    histogram,
                    ratio: histogram.fix_ratio(),
                }),
            },
            RunResult {
                config: PathBuf::from("config/b.conf"),
                outcome: Err(Error::MissingSidecarOutput(PathBuf::from("out/b.pos.stat"))),
            },
            RunResult {
                config: PathBuf::from("config/c.conf"),
                outcome: Ok(Score {
                    histogram: StatusHistogram::default(),
                    ratio: StatusHistogram::default().fix_ratio(),
                }),
            },
        ]
    }

    #[test]
    fn descriptions() {
        let results = results();
        assert_eq!(describe(&results[0]), "config/a.conf returned 80.0%");
        assert_eq!(
            describe(&results[1]),
            "config/b.conf failed: solution status file out/b.pos.stat is missing"
        );
        assert_eq!(
            describe(&results[2]),
            "config/c.conf returned undefined ratio (no fix/float epochs)"
        );
    }

    #[test]
    fn entries() {
        let entries = results().iter().map(Entry::from).collect::<Vec<_>>();
        assert_eq!(entries[0].status, Status::Ok);
        assert_eq!(entries[0].fix_ratio, Some(80.0));
        assert_eq!(entries[0].histogram, Some([8, 2, 0, 0, 0, 0]));
        assert_eq!(entries[1].status, Status::Failed);
        assert!(entries[1].error.is_some());
        assert_eq!(entries[2].status, Status::Undefined);
        assert_eq!(entries[2].fix_ratio, None);
    }

    #[test]
    fn json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_json(&results(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value[0]["status"], "ok");
        assert_eq!(value[1]["status"], "failed");
        assert_eq!(value[2]["status"], "undefined");
        assert!(value[2]["fix_ratio"].is_null());
    }
}
