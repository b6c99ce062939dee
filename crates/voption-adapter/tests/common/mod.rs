/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for voption-adapter tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use voption_adapter::{Credentials, RestConfig, StreamConfig, VoptionClient};
use wiremock::MockServer;

/// Fixed local clock used by signing tests
pub const FIXED_NOW_MS: i64 = 1_700_000_000_000;
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_SECRET: &str = "abc";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn rest_config(server: &MockServer) -> RestConfig {
    RestConfig {
        base_url: server.uri(),
        ..RestConfig::default()
    }
}

/// Signed client whose local clock is pinned to [`FIXED_NOW_MS`]
pub fn signed_client(config: RestConfig) -> VoptionClient {
    VoptionClient::with_config(config)
        .expect("client should build")
        .with_credentials(Credentials::new(TEST_API_KEY, TEST_SECRET))
        .with_clock(Arc::new(|| FIXED_NOW_MS))
}

/// Local push-stream server.
///
/// Every accepted socket is sent `frames` in order, then the server records
/// text frames sent by the client until it disconnects.
pub struct StreamServer {
    pub addr: String,
    accepted: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
    received: Arc<Mutex<Vec<String>>>,
}

impl StreamServer {
    pub async fn start(frames: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stream server");
        let addr = listener.local_addr().expect("local addr").to_string();
        let accepted = Arc::new(AtomicUsize::new(0));
        let paths = Arc::new(Mutex::new(Vec::new()));
        let received = Arc::new(Mutex::new(Vec::new()));

        let server = Self {
            addr,
            accepted: accepted.clone(),
            paths: paths.clone(),
            received: received.clone(),
        };

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                let frames = frames.clone();
                let paths = paths.clone();
                let received = received.clone();
                tokio::spawn(async move {
                    let record_path = move |request: &Request,
                                            response: Response|
                          -> Result<Response, ErrorResponse> {
                        paths.lock().unwrap().push(request.uri().to_string());
                        Ok(response)
                    };
                    let Ok(ws) = accept_hdr_async(stream, record_path).await else {
                        return;
                    };
                    let (mut write, mut read) = ws.split();
                    for frame in frames {
                        if write.send(Message::Text(frame.into())).await.is_err() {
                            return;
                        }
                    }
                    while let Some(Ok(message)) = read.next().await {
                        if let Message::Text(text) = message {
                            received.lock().unwrap().push(text.to_string());
                        }
                    }
                });
            }
        });

        server
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            base_url: format!("ws://{}/ws/", self.addr),
            combined_base_url: format!("ws://{}/stream?streams=", self.addr),
            ..StreamConfig::default()
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    /// Text frames sent by clients, waiting up to one second for `count` of them
    pub async fn wait_received(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let received = self.received.lock().unwrap().clone();
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.received.lock().unwrap().clone()
    }
}

/// Listener that accepts TCP connections but never answers the WebSocket upgrade
pub async fn start_stalled_listener() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stalled listener");
    let addr = listener.local_addr().expect("local addr").to_string();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    addr
}
