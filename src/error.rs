use std::path::PathBuf;

use thiserror::Error;

use crate::archive::FileKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Observation header misses (or has invalid) TIME OF FIRST/LAST OBS fields
    #[error("malformed observation header: {0}")]
    MalformedHeader(String),

    /// Capability that this archive does not offer
    #[error("{archive}: {method} resolution is not implemented")]
    NotImplemented {
        archive: &'static str,
        method: &'static str,
    },

    /// Time window crosses a UTC day boundary
    #[error("time window {0} spans more than one UTC day")]
    UnsupportedWindowSpan(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url}: http status {status}")]
    HttpStatus { url: String, status: u16 },

    /// One download did not complete. Never aborts sibling downloads.
    #[error("failed to download {url}: {cause}")]
    DownloadFailure { url: String, cause: Box<Error> },

    /// Archive listing did not propose any file for this kind
    #[error("no {0} candidate in archive listing")]
    NoCandidates(FileKind),

    /// Every download of this kind failed
    #[error("no {0} base file could be downloaded")]
    NoBaseFiles(FileKind),

    #[error("failed to start {program}: {source}")]
    EngineInvocation {
        program: String,
        source: std::io::Error,
    },

    #[error("solution status file {0} is missing")]
    MissingSidecarOutput(PathBuf),

    #[error("{task} timed out after {after:?}")]
    Timeout {
        task: String,
        after: std::time::Duration,
    },

    /// Format converter did not report this output
    #[error("format converter did not report any {0} output")]
    ConverterOutput(FileKind),

    #[error("reported product {0} is not readable")]
    MissingProduct(PathBuf),

    #[error("unknown archive \"{0}\"")]
    UnknownArchive(String),

    /// Task panicked or got cancelled before settling
    #[error("task aborted before completion")]
    TaskAborted,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
