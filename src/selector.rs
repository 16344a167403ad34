use std::path::PathBuf;

use itertools::Itertools;
use log::{info, warn};

use crate::{
    archive::{FileKind, FileRequest, Provider, ResolvedUrl},
    error::Error,
    fetcher::Fetcher,
    window::{Span, TimeWindow},
};

/// Strategy for windows that cross a UTC day boundary
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum SpanPolicy {
    /// Fail with [Error::UnsupportedWindowSpan]
    #[default]
    Reject,
    /// Use the day of the window start. End of window is not covered.
    BeginDay,
}

/// Base station products, ready to be consumed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseFiles {
    pub obs: Vec<PathBuf>,
    pub nav: Vec<PathBuf>,
}

/// Resolves the products matching this request, picking
/// the hourly or daily archive depending on the window span.
pub async fn select<P: Provider>(
    provider: &P,
    request: &FileRequest,
    policy: SpanPolicy,
) -> Result<Vec<ResolvedUrl>, Error> {
    let window = request.window;
    let station = request.station.as_str();

    match window.span() {
        Span::Hour => {
            provider
                .resolve_hourly(window.begin, station, request.kind)
                .await
        },
        Span::Day => {
            provider
                .resolve_daily(window.begin, station, request.kind)
                .await
        },
        Span::MultiDay => match policy {
            SpanPolicy::Reject => Err(Error::UnsupportedWindowSpan(window.to_string())),
            SpanPolicy::BeginDay => {
                warn!(
                    "{} - window {} crosses a day boundary: only {} is covered",
                    request.kind, window, window.begin
                );
                provider
                    .resolve_daily(window.begin, station, request.kind)
                    .await
            },
        },
    }
}

async fn acquire_kind<P: Provider>(
    provider: &P,
    fetcher: &Fetcher,
    request: FileRequest,
    policy: SpanPolicy,
) -> Result<Vec<PathBuf>, Error> {
    let kind = request.kind;
    let urls = select(provider, &request, policy).await?;

    if urls.is_empty() {
        return Err(Error::NoCandidates(kind));
    }

    info!(
        "{} - {}: downloading {}",
        kind,
        provider.name(),
        urls.iter().map(|resolved| resolved.url.as_str()).join(", ")
    );

    let fetched = fetcher.fetch_all(&urls).await;

    if fetched.files.is_empty() {
        return Err(Error::NoBaseFiles(kind));
    }

    Ok(fetched.files.into_iter().map(|file| file.path).collect())
}

/// Downloads both Observation and Navigation products of `station`
/// that match the time window.
pub async fn acquire<P: Provider>(
    provider: &P,
    fetcher: &Fetcher,
    station: &str,
    window: TimeWindow,
    policy: SpanPolicy,
) -> Result<BaseFiles, Error> {
    let obs = FileRequest {
        kind: FileKind::Obs,
        station: station.to_string(),
        window,
    };

    let nav = FileRequest {
        kind: FileKind::Nav,
        ..obs.clone()
    };

    let (obs, nav) = tokio::try_join!(
        acquire_kind(provider, fetcher, obs, policy),
        acquire_kind(provider, fetcher, nav, policy),
    )?;

    Ok(BaseFiles { obs, nav })
}
