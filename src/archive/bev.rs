//! BEV regional data center (cf. https://epncb.eu/ftp/center/data/BEV.RDC)
use std::time::Duration;

use hifitime::prelude::Epoch;
use log::debug;
use reqwest::Client;

use crate::{
    archive::{FileKind, Provider, ResolvedUrl, scan_listing},
    error::Error,
    utils::day_of_year,
};

pub const DEFAULT_ROOT: &str = "https://gnss.bev.gv.at/at.gv.bev.dc/data";

pub struct Bev {
    client: Client,
    /// Archive root URL, without trailing '/'
    root: String,
    /// Listing timeout
    timeout: Duration,
}

impl Bev {
    pub fn new(client: Client, root: &str, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            root: root.trim_end_matches('/').to_string(),
        }
    }

    /// Near real time, hourly directory: /nrt/<year>/<doy>/<hour>/
    pub fn hourly_directory(&self, date: Epoch) -> String {
        let (year, _, _, hour, _, _, _) = date.to_gregorian_utc();
        format!(
            "{}/nrt/{}/{:03}/{:02}/",
            self.root,
            year,
            day_of_year(date),
            hour
        )
    }

    /// Daily directory: /obs/<year>/<doy>/
    pub fn daily_directory(&self, date: Epoch) -> String {
        let (year, _, _, _, _, _, _) = date.to_gregorian_utc();
        format!("{}/obs/{}/{:03}/", self.root, year, day_of_year(date))
    }

    async fn list(&self, directory: &str, station: &str, kind: FileKind) -> Result<Vec<ResolvedUrl>, Error> {
        debug!("{} - listing {}", kind, directory);

        let request = async {
            let response = self.client.get(directory).send().await?;
            let status = response.status();

            if !status.is_success() {
                return Err(Error::HttpStatus {
                    url: directory.to_string(),
                    status: status.as_u16(),
                });
            }

            Ok(response.text().await?)
        };

        let page = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| Error::Timeout {
                task: format!("listing {}", directory),
                after: self.timeout,
            })??;

        Ok(scan_listing(&page, directory, station, kind))
    }
}

impl Provider for Bev {
    fn name(&self) -> &'static str {
        "BEV"
    }

    async fn resolve_hourly(
        &self,
        date: Epoch,
        station: &str,
        kind: FileKind,
    ) -> Result<Vec<ResolvedUrl>, Error> {
        let directory = self.hourly_directory(date);
        self.list(&directory, station, kind).await
    }

    async fn resolve_daily(
        &self,
        date: Epoch,
        station: &str,
        kind: FileKind,
    ) -> Result<Vec<ResolvedUrl>, Error> {
        let directory = self.daily_directory(date);
        self.list(&directory, station, kind).await
    }
}

#[cfg(test)]
mod test {
    use super::{Bev, DEFAULT_ROOT};
    use crate::{
        archive::{FileKind, Provider},
        error::Error,
        testing::{Route, serve},
    };
    use hifitime::prelude::Epoch;
    use reqwest::Client;
    use std::time::Duration;

    #[test]
    fn directories() {
        let bev = Bev::new(Client::new(), DEFAULT_ROOT, Duration::from_secs(1));
        let t = Epoch::from_gregorian_utc(2023, 7, 10, 9, 15, 0, 0);

        assert_eq!(
            bev.hourly_directory(t),
            "https://gnss.bev.gv.at/at.gv.bev.dc/data/nrt/2023/191/09/"
        );
        assert_eq!(
            bev.daily_directory(t),
            "https://gnss.bev.gv.at/at.gv.bev.dc/data/obs/2023/191/"
        );

        let t = Epoch::from_gregorian_utc(2024, 1, 5, 23, 0, 0, 0);
        assert_eq!(
            bev.hourly_directory(t),
            "https://gnss.bev.gv.at/at.gv.bev.dc/data/nrt/2024/005/23/"
        );
    }

    #[tokio::test]
    async fn hourly_listing() {
        let listing = br#"<a href="MAH100IRL_R_20231910900_01H_GN.rnx.gz">x</a>
<a href="MAH100IRL_R_20231910900_01H_01S_MO.crx.gz">y</a>"#;

        let root = serve(vec![Route::ok("/nrt/2023/191/09/", listing.to_vec())]).await;

        let bev = Bev::new(Client::new(), &root, Duration::from_secs(5));
        let t = Epoch::from_gregorian_utc(2023, 7, 10, 9, 15, 0, 0);

        let obs = bev
            .resolve_hourly(t, "MAH100IRL", FileKind::Obs)
            .await
            .unwrap();

        assert_eq!(obs.len(), 1);
        assert_eq!(
            obs[0].url,
            format!("{}/nrt/2023/191/09/MAH100IRL_R_20231910900_01H_01S_MO.crx.gz", root)
        );

        let nav = bev
            .resolve_hourly(t, "MAH100IRL", FileKind::Nav)
            .await
            .unwrap();

        assert_eq!(nav.len(), 1);
        assert!(nav[0].url.ends_with("_GN.rnx.gz"));
    }

    #[tokio::test]
    async fn missing_directory() {
        let root = serve(vec![]).await;
        let bev = Bev::new(Client::new(), &root, Duration::from_secs(5));
        let t = Epoch::from_gregorian_utc(2023, 7, 10, 9, 15, 0, 0);

        match bev.resolve_daily(t, "MAH100IRL", FileKind::Nav).await {
            Err(Error::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn stalled_listing() {
        let root = serve(vec![Route::stall("/obs/2023/191/")]).await;
        let bev = Bev::new(Client::new(), &root, Duration::from_millis(300));
        let t = Epoch::from_gregorian_utc(2023, 7, 10, 9, 15, 0, 0);

        match bev.resolve_daily(t, "MAH100IRL", FileKind::Obs).await {
            Err(Error::Timeout { task, after }) => {
                assert_eq!(task, format!("listing {}/obs/2023/191/", root));
                assert_eq!(after, Duration::from_millis(300));
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
