/*
[INPUT]:  Stream paths, handler channels and (for user data) a REST client
[OUTPUT]: Normalized push events delivered to handlers; idempotent connections
[POS]:    WebSocket layer - connection registry and socket pumps
[UPDATE]: When adding stream subscriptions or changing connection handling
*/

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::{Result, VoptionClient, VoptionError};
use crate::types::StreamEvent;

use super::message::{PLAINTEXT_MODE_REQUEST, parse_frame};
use super::streams;
use super::user_data::{DEFAULT_KEEP_ALIVE_INTERVAL, UserDataSession, UserDataStatus};

const STREAM_BASE_URL: &str = "wss://vstream.binance.com/ws/";
const COMBINED_STREAM_BASE_URL: &str = "wss://vstream.binance.com/stream?streams=";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handler side of a subscription
pub type StreamSender = mpsc::Sender<StreamEvent>;

/// Push-stream configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub base_url: String,
    pub combined_base_url: String,
    /// Ask for uncompressed text frames right after connecting
    pub plaintext_handshake: bool,
    pub normalize: bool,
    /// Upper bound on the TCP connect plus WebSocket upgrade
    pub connect_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: STREAM_BASE_URL.to_string(),
            combined_base_url: COMBINED_STREAM_BASE_URL.to_string(),
            plaintext_handshake: true,
            normalize: true,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct StreamConnection {
    url: String,
    handlers: Mutex<Vec<StreamSender>>,
    shutdown: CancellationToken,
}

/// Shared handle to one open socket
#[derive(Debug, Clone)]
pub struct StreamHandle {
    inner: Arc<StreamConnection>,
}

impl StreamHandle {
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// True once the socket ended (closed by either side or a transport error)
    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Tear the socket down
    pub fn close(&self) {
        self.inner.shutdown.cancel();
    }

    pub fn same_connection(&self, other: &StreamHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    async fn add_handler(&self, handler: StreamSender) {
        self.inner.handlers.lock().await.push(handler);
    }
}

/// Streaming client for the options push service.
///
/// Connections are registered by URL, so subscribing to the same path twice
/// reuses one socket. Terminated sockets are not reconnected.
#[derive(Debug)]
pub struct VoptionWebSocket {
    config: StreamConfig,
    registry: Mutex<HashMap<String, StreamHandle>>,
    user_data: Mutex<Option<UserDataSession>>,
}

impl VoptionWebSocket {
    /// Create a new WebSocket client
    pub fn new() -> Self {
        Self::with_config(StreamConfig::default())
    }

    pub fn with_config(config: StreamConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(HashMap::new()),
            user_data: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    fn stream_url(&self, path: &str, combined: bool) -> String {
        let base = if combined {
            &self.config.combined_base_url
        } else {
            &self.config.base_url
        };
        format!("{base}{path}")
    }

    /// Open (or reuse) the socket for `path` and route its events to `handler`.
    ///
    /// An open connection for the same path gets `handler` attached instead
    /// of a second socket being opened. The registry is not locked while
    /// connecting, so a stalled handshake only holds up its own caller.
    pub async fn subscribe(
        &self,
        path: &str,
        combined: bool,
        handler: StreamSender,
    ) -> Result<StreamHandle> {
        let url = self.stream_url(path, combined);

        let existing = open_entry(&*self.registry.lock().await, &url);
        if let Some(existing) = existing {
            debug!(url = %url, "reusing open stream");
            existing.add_handler(handler).await;
            return Ok(existing);
        }

        let handle = self.connect(url.clone(), handler).await?;

        let mut registry = self.registry.lock().await;
        if let Some(existing) = open_entry(&registry, &url) {
            // another caller connected the same path meanwhile; keep theirs
            drop(registry);
            debug!(url = %url, "concurrent connect lost; merging handlers");
            let handlers = std::mem::take(&mut *handle.inner.handlers.lock().await);
            handle.close();
            for handler in handlers {
                existing.add_handler(handler).await;
            }
            return Ok(existing);
        }
        if registry.insert(url.clone(), handle.clone()).is_some() {
            debug!(url = %url, "replaced terminated stream");
        }
        Ok(handle)
    }

    async fn connect(&self, url: String, handler: StreamSender) -> Result<StreamHandle> {
        let (ws_stream, _response) =
            tokio::time::timeout(self.config.connect_timeout, connect_async(url.as_str()))
                .await
                .map_err(|_| {
                    VoptionError::WebSocket(format!(
                        "connect {url}: no upgrade within {}ms",
                        self.config.connect_timeout.as_millis()
                    ))
                })?
                .map_err(|err| VoptionError::WebSocket(format!("connect {url}: {err}")))?;
        let (mut write, mut read) = ws_stream.split();

        if self.config.plaintext_handshake {
            write
                .send(WsMessage::Text(PLAINTEXT_MODE_REQUEST.into()))
                .await
                .map_err(|err| VoptionError::WebSocket(format!("plaintext handshake: {err}")))?;
        }
        info!(url = %url, "ws stream connected");

        let handle = StreamHandle {
            inner: Arc::new(StreamConnection {
                url,
                handlers: Mutex::new(vec![handler]),
                shutdown: CancellationToken::new(),
            }),
        };

        let connection = handle.inner.clone();
        let normalize = self.config.normalize;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = connection.shutdown.cancelled() => {
                        let _ = write.send(WsMessage::Close(None)).await;
                        break;
                    }
                    incoming = read.next() => {
                        let text = match incoming {
                            Some(Ok(WsMessage::Text(text))) => text.to_string(),
                            Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                                Ok(text) => text,
                                Err(_) => {
                                    debug!(url = %connection.url, bytes = bytes.len(), "non-utf8 binary frame skipped");
                                    continue;
                                }
                            },
                            Some(Ok(WsMessage::Close(_))) => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                            Some(Ok(_)) => continue,
                            Some(Err(err)) => {
                                warn!(url = %connection.url, error = %err, "ws transport error; stream stopped");
                                break;
                            }
                            None => break,
                        };

                        let Some(event) = parse_frame(&text, normalize) else {
                            continue;
                        };
                        if !dispatch(&connection, event).await {
                            debug!(url = %connection.url, "all handlers dropped");
                            break;
                        }
                    }
                }
            }

            connection.shutdown.cancel();
            info!(url = %connection.url, "ws stream closed");
        });

        Ok(handle)
    }

    pub async fn on_trade(&self, symbol: &str, handler: StreamSender) -> Result<StreamHandle> {
        self.subscribe(&streams::trade(symbol), false, handler).await
    }

    pub async fn on_ticker(&self, symbol: &str, handler: StreamSender) -> Result<StreamHandle> {
        self.subscribe(&streams::ticker(symbol), false, handler).await
    }

    pub async fn on_depth(&self, symbol: &str, handler: StreamSender) -> Result<StreamHandle> {
        self.subscribe(&streams::depth(symbol), false, handler).await
    }

    pub async fn on_kline(
        &self,
        symbol: &str,
        interval: &str,
        handler: StreamSender,
    ) -> Result<StreamHandle> {
        self.subscribe(&streams::kline(symbol, interval), false, handler)
            .await
    }

    /// One socket multiplexing every stream in `stream_names`
    pub async fn on_combined_stream(
        &self,
        stream_names: &[String],
        handler: StreamSender,
    ) -> Result<StreamHandle> {
        self.subscribe(&streams::combined(stream_names), true, handler)
            .await
    }

    /// Ticker streams for every listed option contract over one combined socket
    pub async fn subscribe_all_tickers(
        &self,
        rest: &VoptionClient,
        handler: StreamSender,
    ) -> Result<StreamHandle> {
        let info = rest.option_info().await?;
        let stream_names: Vec<String> = contract_symbols(&info)
            .into_iter()
            .map(streams::ticker)
            .collect();
        if stream_names.is_empty() {
            return Err(VoptionError::InvalidResponse(
                "option info listed no contracts".to_string(),
            ));
        }
        info!(contracts = stream_names.len(), "subscribing all option tickers");
        self.on_combined_stream(&stream_names, handler).await
    }

    /// Start a user-data session and stream it, renewing the listen key every minute
    pub async fn subscribe_user_data(
        &self,
        rest: &VoptionClient,
        handler: StreamSender,
    ) -> Result<StreamHandle> {
        self.subscribe_user_data_with_interval(rest, handler, DEFAULT_KEEP_ALIVE_INTERVAL)
            .await
    }

    /// Clears any previous keep-alive timer, requests a listen key, opens the
    /// socket on it and only then schedules the key's renewal.
    pub async fn subscribe_user_data_with_interval(
        &self,
        rest: &VoptionClient,
        handler: StreamSender,
        keep_alive_interval: Duration,
    ) -> Result<StreamHandle> {
        self.close_user_data().await;

        let listen_key = rest.start_listen_key().await?;
        let handle = self.subscribe(&listen_key, false, handler).await?;

        let session = UserDataSession::spawn(rest.clone(), listen_key, keep_alive_interval);
        *self.user_data.lock().await = Some(session);
        Ok(handle)
    }

    /// Cancel the keep-alive timer of the current user-data session, if any
    pub async fn close_user_data(&self) {
        if let Some(session) = self.user_data.lock().await.take() {
            info!("user data keep-alive cleared");
            session.join().await;
        }
    }

    pub async fn user_data_status(&self) -> Option<UserDataStatus> {
        self.user_data
            .lock()
            .await
            .as_ref()
            .map(UserDataSession::status)
    }

    /// Number of registered connections that are still open
    pub async fn open_connections(&self) -> usize {
        self.registry
            .lock()
            .await
            .values()
            .filter(|handle| !handle.is_closed())
            .count()
    }

    /// Close every socket and the user-data keep-alive
    pub async fn shutdown(&self) {
        self.close_user_data().await;
        let mut registry = self.registry.lock().await;
        for handle in registry.values() {
            handle.close();
        }
        registry.clear();
    }
}

impl Default for VoptionWebSocket {
    fn default() -> Self {
        Self::new()
    }
}

/// Send to every live handler; false once none are left.
///
/// Sends happen on a snapshot so a slow handler never blocks `add_handler`.
async fn dispatch(connection: &StreamConnection, event: StreamEvent) -> bool {
    let snapshot = connection.handlers.lock().await.clone();
    for handler in &snapshot {
        let _ = handler.send(event.clone()).await;
    }

    let mut handlers = connection.handlers.lock().await;
    handlers.retain(|handler| !handler.is_closed());
    !handlers.is_empty()
}

fn open_entry(registry: &HashMap<String, StreamHandle>, url: &str) -> Option<StreamHandle> {
    registry.get(url).filter(|handle| !handle.is_closed()).cloned()
}

/// Contract symbols from an option info response (options envelope or bare list)
fn contract_symbols(info: &Value) -> Vec<&str> {
    let contracts = info.get("data").unwrap_or(info);
    contracts
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("symbol").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}
