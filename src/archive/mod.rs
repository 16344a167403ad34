use std::str::FromStr;

use hifitime::prelude::Epoch;
use itertools::Itertools;
use log::trace;

use crate::{error::Error, window::TimeWindow};

pub mod bev;
pub mod bkge;

pub use bev::Bev;
pub use bkge::Bkge;

const ANCHOR: &str = "<a href=\"";

/// Kind of base station product
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Observation RINEX
    Obs,
    /// Navigation RINEX
    Nav,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Obs => write!(f, "OBS"),
            Self::Nav => write!(f, "NAV"),
        }
    }
}

impl FileKind {
    /// Long filename suffix, as published by the archives
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Obs => "_MO.crx.gz",
            Self::Nav => ".rnx.gz",
        }
    }
}

/// Describes what must be fetched, not how.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRequest {
    pub kind: FileKind,
    pub station: String,
    pub window: TimeWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUrl {
    pub url: String,
    pub kind: FileKind,
}

/// Remote archive of base station data.
pub trait Provider {
    /// Name of this archive
    fn name(&self) -> &'static str;

    /// Lists the products of the UTC hour `date` belongs to.
    async fn resolve_hourly(
        &self,
        date: Epoch,
        station: &str,
        kind: FileKind,
    ) -> Result<Vec<ResolvedUrl>, Error>;

    /// Lists the products of the UTC day `date` belongs to.
    async fn resolve_daily(
        &self,
        date: Epoch,
        station: &str,
        kind: FileKind,
    ) -> Result<Vec<ResolvedUrl>, Error>;
}

/// Supported archives
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum Archive {
    /// BEV (Austria) regional data center
    #[default]
    Bev,
    /// BKG (Germany) regional data center
    Bkge,
}

impl std::fmt::Display for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bev => write!(f, "BEV"),
            Self::Bkge => write!(f, "BKGE"),
        }
    }
}

impl FromStr for Archive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BEV" => Ok(Self::Bev),
            "BKGE" | "BKG" => Ok(Self::Bkge),
            _ => Err(Error::UnknownArchive(s.to_string())),
        }
    }
}

/// Scans a directory listing for `station` products of given [FileKind].
/// `directory` is the listed URL, terminated by '/'.
pub fn scan_listing(page: &str, directory: &str, station: &str, kind: FileKind) -> Vec<ResolvedUrl> {
    page.match_indices(ANCHOR)
        .filter_map(|(offset, _)| {
            let href = &page[offset + ANCHOR.len()..];
            let end = href.find('"')?;
            let name = &href[..end];

            if name.starts_with(station) && name.ends_with(kind.suffix()) {
                Some(name)
            } else {
                trace!("{} - {} discarded", kind, name);
                None
            }
        })
        .unique()
        .map(|name| ResolvedUrl {
            url: format!("{}{}", directory, name),
            kind,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::{Archive, FileKind, scan_listing};
    use std::str::FromStr;

    const LISTING: &str = r#"<html><body><pre>
<a href="../">../</a>
<a href="MAH100IRL_R_20231910000_01D_GN.rnx.gz">MAH100IRL_R_20231910000_01D_GN.rnx.gz</a>  10-Jul-2023 23:59  12k
<a href="MAH100IRL_R_20231910000_01D_GN.rnx.gz.md5">MAH100IRL_R_20231910000_01D_GN.rnx.gz.md5</a>
<a href="README" title="MAH100IRL_R_20231910000_01D_30S_MO.crx.gz">README</a>
<a href="XMAH100IRL_R_20231910000_01D_RN.rnx.gz">XMAH100IRL_R_20231910000_01D_RN.rnx.gz</a>
<a href="GRAZ00AUT_R_20231910000_01D_30S_MO.crx.gz">GRAZ00AUT_R_20231910000_01D_30S_MO.crx.gz</a>
</pre></body></html>"#;

    const DIR: &str = "https://archive.test/obs/2023/191/";

    #[test]
    fn navigation_listing() {
        let urls = scan_listing(LISTING, DIR, "MAH100IRL", FileKind::Nav);
        assert_eq!(urls.len(), 1);
        assert_eq!(
            urls[0].url,
            "https://archive.test/obs/2023/191/MAH100IRL_R_20231910000_01D_GN.rnx.gz"
        );
        assert!(urls[0].url.ends_with(".rnx.gz"));
        assert_eq!(urls[0].kind, FileKind::Nav);
    }

    #[test]
    fn no_observation_anchor() {
        let urls = scan_listing(LISTING, DIR, "MAH100IRL", FileKind::Obs);
        assert!(urls.is_empty());
    }

    #[test]
    fn observation_listing() {
        let urls = scan_listing(LISTING, DIR, "GRAZ00AUT", FileKind::Obs);
        assert_eq!(urls.len(), 1);
        assert!(urls[0].url.ends_with("GRAZ00AUT_R_20231910000_01D_30S_MO.crx.gz"));

        assert!(scan_listing(LISTING, DIR, "GRAZ00AUT", FileKind::Nav).is_empty());
    }

    #[test]
    fn duplicated_anchors() {
        let page = format!("{}{}", LISTING, LISTING);
        let urls = scan_listing(&page, DIR, "MAH100IRL", FileKind::Nav);
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn unterminated_anchor() {
        let urls = scan_listing("<a href=\"MAH100IRL_R_GN.rnx.gz", DIR, "MAH100IRL", FileKind::Nav);
        assert!(urls.is_empty());
    }

    #[test]
    fn archive_names() {
        assert_eq!(Archive::from_str("BEV").unwrap(), Archive::Bev);
        assert_eq!(Archive::from_str("bkge").unwrap(), Archive::Bkge);
        assert!(Archive::from_str("IGS").is_err());
    }
}
