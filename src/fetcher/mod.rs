use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, error, info};
use reqwest::{Client, Response};
use tokio::{sync::mpsc, task::JoinSet};

use crate::{
    archive::{FileKind, ResolvedUrl},
    error::Error,
    settle::settle_all,
    utils::local_filename,
};

mod fd;

use fd::FileDescriptor;

/// Chunks in flight, between network and file system
const CHANNEL_DEPTH: usize = 32;

/// Streamed to the file writer
#[derive(Debug)]
enum Message {
    /// Downloaded content
    Chunk(Vec<u8>),
    /// Content is complete
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Outcome of a batch of downloads
#[derive(Debug, Default)]
pub struct Fetched {
    /// Successful downloads, in request order
    pub files: Vec<DownloadedFile>,
    /// [Error::DownloadFailure]s, in request order
    pub failures: Vec<Error>,
}

/// Downloads (and decompresses) archive products into a local directory.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    directory: PathBuf,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(client: Client, directory: &Path, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            directory: directory.to_path_buf(),
        }
    }

    /// Local destination of a remote product
    pub fn local_path(&self, url: &str) -> PathBuf {
        self.directory.join(local_filename(url))
    }

    /// Downloads all `urls` concurrently. Waits for all of them to settle:
    /// one failure never interrupts the other downloads.
    pub async fn fetch_all(&self, urls: &[ResolvedUrl]) -> Fetched {
        let mut tasks = JoinSet::new();

        for (index, resolved) in urls.iter().enumerate() {
            let client = self.client.clone();
            let timeout = self.timeout;
            let url = resolved.url.clone();
            let kind = resolved.kind;
            let path = self.local_path(&url);

            tasks.spawn(async move {
                debug!("{} - downloading {}", kind, url);

                let outcome = match tokio::time::timeout(timeout, download(&client, &url, &path)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(Error::Timeout {
                        task: format!("download {}", url),
                        after: timeout,
                    }),
                };

                match outcome {
                    Ok(()) => (index, Ok(DownloadedFile { path, kind })),
                    Err(cause) => (
                        index,
                        Err(Error::DownloadFailure {
                            url,
                            cause: Box::new(cause),
                        }),
                    ),
                }
            });
        }

        let mut fetched = Fetched::default();

        for outcome in settle_all(tasks, urls.len()).await {
            match outcome {
                Ok(file) => {
                    info!("{} - {} downloaded", file.kind, file.path.display());
                    fetched.files.push(file);
                },
                Err(e) => {
                    error!("{}", e);
                    fetched.failures.push(e);
                },
            }
        }

        fetched
    }
}

/// Streams `url` into `path`, gunzip'ing .gz resources.
/// File system accesses happen on a blocking thread, fed through a channel.
/// Nothing is left at `path` (nor at its partial location) unless the download completes.
async fn download(client: &Client, url: &str, path: &Path) -> Result<(), Error> {
    let mut response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);

    let gunzip = url.ends_with(".gz");
    let destination = path.to_path_buf();

    let writer = tokio::task::spawn_blocking(move || store(gunzip, &destination, rx));

    let streamed = stream(&mut response, url, tx).await;
    let stored = writer.await.map_err(|_| Error::TaskAborted)?;

    streamed?;
    stored
}

/// Forwards the response body to the writer
async fn stream(response: &mut Response, url: &str, tx: mpsc::Sender<Message>) -> Result<(), Error> {
    while let Some(chunk) = response.chunk().await? {
        if tx.send(Message::Chunk(chunk.to_vec())).await.is_err() {
            // writer failure is reported by the writer
            return Ok(());
        }
    }

    if tx.send(Message::End).await.is_err() {
        debug!("{} - writer closed before end of content", url);
    }

    Ok(())
}

/// Writes all received chunks. Content is committed on [Message::End] only.
fn store(gunzip: bool, path: &Path, mut rx: mpsc::Receiver<Message>) -> Result<(), Error> {
    let mut fd = FileDescriptor::new(gunzip, path)?;

    while let Some(message) = rx.blocking_recv() {
        match message {
            Message::Chunk(chunk) => fd.write_all(&chunk)?,
            Message::End => {
                fd.finish()?;
                return Ok(());
            },
        }
    }

    Err(Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("{} - interrupted", path.display()),
    )))
}
