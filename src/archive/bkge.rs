//! BKG regional data center (cf. https://epncb.eu/ftp/center/data/BKGE.RDC)
use hifitime::prelude::Epoch;

use crate::{
    archive::{FileKind, Provider, ResolvedUrl},
    error::Error,
};

/// Declared, but its directory layout is not supported yet.
#[derive(Debug, Default)]
pub struct Bkge;

impl Provider for Bkge {
    fn name(&self) -> &'static str {
        "BKGE"
    }

    async fn resolve_hourly(
        &self,
        _: Epoch,
        _: &str,
        _: FileKind,
    ) -> Result<Vec<ResolvedUrl>, Error> {
        Err(Error::NotImplemented {
            archive: self.name(),
            method: "hourly",
        })
    }

    async fn resolve_daily(
        &self,
        _: Epoch,
        _: &str,
        _: FileKind,
    ) -> Result<Vec<ResolvedUrl>, Error> {
        Err(Error::NotImplemented {
            archive: self.name(),
            method: "daily",
        })
    }
}
