//! Shared test utilities for integration tests

#![allow(dead_code)]

use season_averages_etl::{EtlConfig, StaticSecretProvider};
use serde_json::{json, Value};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A one-shot HTTP endpoint that answers the first request with a canned response
pub struct MockApi {
    pub base_url: String,
    request_line: oneshot::Receiver<String>,
}

impl MockApi {
    /// The request line (`GET /path?query HTTP/1.1`) the server received
    pub async fn request_line(self) -> String {
        self.request_line.await.expect("mock API received no request")
    }
}

pub async fn serve(status: u16, body: impl Into<String>) -> MockApi {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut head = Vec::new();
        let mut chunk = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&chunk[..n]);
        }

        let request_line =
            String::from_utf8_lossy(&head).lines().next().unwrap_or_default().to_string();
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    MockApi { base_url: format!("http://{}", addr), request_line: rx }
}

pub async fn serve_json(status: u16, body: &Value) -> MockApi {
    serve(status, body.to_string()).await
}

/// The season 2017 record for player 274
pub fn season_record() -> Value {
    json!({
        "player_id": 274,
        "games_played": 10,
        "season": 2017,
        "min": "30.5",
        "ftm": 2,
        "fgm": 5,
        "fg3m": 1,
        "dreb": 3,
        "oreb": 1,
        "ast": 4,
        "pf": 2
    })
}

/// URL of a SQLite database file that is created on first connect
pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

/// Base URL of a local port that nothing listens on
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Configuration pointing at the mock API and the given database URL
pub fn test_config(api: &MockApi, database_url: &str) -> EtlConfig {
    config_for(&api.base_url, database_url)
}

pub fn config_for(base_url: &str, database_url: &str) -> EtlConfig {
    let mut config = EtlConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_secs = 5;
    config.query.season = 2017;
    config.query.player_ids = vec![274];
    config.database.url = Some(database_url.to_string());
    config
}

pub fn test_secrets() -> Box<StaticSecretProvider> {
    Box::new(StaticSecretProvider::new("unused"))
}
