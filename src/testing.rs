//! Loopback HTTP responder used by the test suites
use std::{sync::Arc, time::Duration};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Behavior {
    /// Complete response
    Answer,
    /// Never answers
    Stall,
    /// Sends the headers and part of the body, then hangs
    Truncate,
}

pub struct Route {
    pub path: &'static str,
    pub status: u16,
    pub body: Vec<u8>,
    pub behavior: Behavior,
}

impl Route {
    pub fn ok(path: &'static str, body: Vec<u8>) -> Self {
        Self {
            path,
            body,
            status: 200,
            behavior: Behavior::Answer,
        }
    }

    pub fn status(path: &'static str, status: u16) -> Self {
        Self {
            path,
            status,
            body: Vec::new(),
            behavior: Behavior::Answer,
        }
    }

    pub fn stall(path: &'static str) -> Self {
        Self {
            path,
            status: 200,
            body: Vec::new(),
            behavior: Behavior::Stall,
        }
    }

    /// Announces twice the length of `body`, sends `body`, then hangs
    pub fn truncate(path: &'static str, body: Vec<u8>) -> Self {
        Self {
            path,
            body,
            status: 200,
            behavior: Behavior::Truncate,
        }
    }
}

/// Serves `routes` on a random local port, returns the root URL.
/// Unknown paths get a 404.
pub async fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();

            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];

                loop {
                    let size = socket.read(&mut buf).await.unwrap_or(0);
                    if size == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..size]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/");

                let (status, body, behavior) = match routes.iter().find(|route| route.path == path) {
                    Some(route) => (route.status, route.body.clone(), route.behavior),
                    None => (404, Vec::new(), Behavior::Answer),
                };

                if behavior == Behavior::Stall {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    return;
                }

                let reason = if status == 200 { "OK" } else { "Error" };

                let length = match behavior {
                    Behavior::Truncate => body.len() * 2,
                    _ => body.len(),
                };

                let header = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status, reason, length
                );

                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(&body).await;

                if behavior == Behavior::Truncate {
                    let _ = socket.flush().await;
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    return;
                }

                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

/// Gzip compresses `content`
pub fn gzip(content: &[u8]) -> Vec<u8> {
    use flate2::{Compression, write::GzEncoder};
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(5));
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}
