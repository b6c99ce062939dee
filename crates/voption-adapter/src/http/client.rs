/*
[INPUT]:  REST configuration (base URL, timeout, credentials, drift/normalize switches)
[OUTPUT]: Normalized JSON payloads from signed and unsigned exchange calls
[POS]:    HTTP layer - core client and the generic request routine
[UPDATE]: When adding connection options or changing request/retry behavior
*/

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Proxy, Url};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::{ClockFn, DriftClock, QuerySigner};
use crate::http::{QueryParams, Result, VoptionError};
use crate::normalize::normalize_route;
use crate::types::{Endpoint, SecurityLevel, Venue};

/// Default REST base URL (options venue)
pub const DEFAULT_BASE_URL: &str = "https://vapi.binance.com/";
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// REST client configuration
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub venue: Venue,
    pub timeout: Duration,
    /// Merged into every signed query as `recvWindow`
    pub recv_window: Option<u64>,
    /// Recompute drift and retry once on a timestamp-ahead rejection
    pub handle_drift: bool,
    /// Rewrite response field names
    pub normalize: bool,
    /// Outbound proxy URL, e.g. `http://127.0.0.1:7890`
    pub proxy: Option<String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            venue: Venue::Options,
            timeout: Duration::from_secs(5),
            recv_window: None,
            handle_drift: false,
            normalize: true,
            proxy: None,
        }
    }
}

/// API key and secret. The secret never appears in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Main REST client for the options exchange.
///
/// Cheap to clone; clones share the drift estimate and the time-sync task.
#[derive(Debug, Clone)]
pub struct VoptionClient {
    http_client: Client,
    base_url: Url,
    config: RestConfig,
    credentials: Option<Credentials>,
    signer: Option<QuerySigner>,
    clock: DriftClock,
    time_sync: Arc<Mutex<Option<CancellationToken>>>,
}

impl VoptionClient {
    /// Create an unauthenticated client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(RestConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: RestConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }
        let http_client = builder.build()?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http_client,
            base_url: Url::parse(&base_url)?,
            config,
            credentials: None,
            signer: None,
            clock: DriftClock::new(),
            time_sync: Arc::new(Mutex::new(None)),
        })
    }

    /// Set credentials for API-key and signed requests
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.signer = Some(QuerySigner::new(credentials.secret.clone()));
        self.credentials = Some(credentials);
        self
    }

    /// Replace the local clock (epoch milliseconds)
    pub fn with_clock(mut self, clock: ClockFn) -> Self {
        self.clock = DriftClock::with_clock(clock);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn clock(&self) -> &DriftClock {
        &self.clock
    }

    pub(crate) fn venue(&self) -> Venue {
        self.config.venue
    }

    /// Issue a catalog endpoint
    pub async fn call(&self, endpoint: &Endpoint, params: QueryParams) -> Result<Value> {
        self.request(params, endpoint.route, endpoint.security, endpoint.method.clone())
            .await
    }

    /// Generic request routine.
    ///
    /// Signed requests get `recvWindow` (when configured), a drift-corrected
    /// `timestamp` (when absent) and a trailing `signature`. A 400 carrying
    /// the timestamp-ahead code is retried at most once per call after the
    /// drift is recomputed, when drift handling is enabled.
    pub async fn request(
        &self,
        mut params: QueryParams,
        route: &str,
        security: SecurityLevel,
        method: Method,
    ) -> Result<Value> {
        let mut attempt = 0u8;
        loop {
            match self.send_once(&params, route, security, &method).await {
                Err(err) if attempt == 0 && self.config.handle_drift && err.is_timestamp_ahead() => {
                    warn!(route, error = %err, "timestamp ahead of server, recalculating drift");
                    // recalculate_drift goes back through `request` via `time`
                    Box::pin(self.recalculate_drift()).await?;
                    params.insert("timestamp", self.clock.current_timestamp());
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    async fn send_once(
        &self,
        params: &QueryParams,
        route: &str,
        security: SecurityLevel,
        method: &Method,
    ) -> Result<Value> {
        let url = self.build_url(params, route, security)?;
        debug!(route, security = security.as_str(), method = %method, "exchange request");

        let mut builder = self.http_client.request(method.clone(), url);
        if security.requires_api_key() {
            let credentials = self.require_credentials(route, security)?;
            builder = builder.header(API_KEY_HEADER, credentials.key.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let payload = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));

        if !status.is_success() {
            debug!(route, status = status.as_u16(), "exchange rejected request");
            return Err(VoptionError::api_error(status, payload));
        }

        if self.config.normalize {
            Ok(normalize_route(payload, route))
        } else {
            Ok(payload)
        }
    }

    /// Full request URL, including the signature for signed requests
    pub(crate) fn build_url(
        &self,
        params: &QueryParams,
        route: &str,
        security: SecurityLevel,
    ) -> Result<Url> {
        let mut url = self.base_url.join(route.trim_start_matches('/'))?;

        let query = if security == SecurityLevel::Signed {
            let signer = self
                .signer
                .as_ref()
                .ok_or_else(|| missing_credentials(route, security))?;
            let mut params = params.clone();
            if let Some(recv_window) = self.config.recv_window {
                params.insert("recvWindow", recv_window);
            }
            if !params.contains("timestamp") {
                params.insert("timestamp", self.clock.current_timestamp());
            }
            let canonical = params.encode();
            let signature = signer.sign(&canonical);
            Some(format!("{canonical}&signature={signature}"))
        } else if params.is_empty() {
            None
        } else {
            Some(params.encode())
        };

        url.set_query(query.as_deref());
        Ok(url)
    }

    fn require_credentials(&self, route: &str, security: SecurityLevel) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| missing_credentials(route, security))
    }

    /// Re-estimate the offset to the server clock from one round trip.
    ///
    /// On failure the previous drift is kept and the error returned.
    pub async fn recalculate_drift(&self) -> Result<i64> {
        let sent = self.clock.local_ms();
        let payload = self.time().await?;
        let received = self.clock.local_ms();

        let server_time = payload
            .get("serverTime")
            .or_else(|| payload.get("data"))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                VoptionError::InvalidResponse(format!("server time missing in {payload}"))
            })?;

        let drift = self.clock.apply_sample(sent, server_time, received);
        info!(drift_ms = drift, round_trip_ms = received - sent, "clock drift recalculated");
        Ok(drift)
    }

    /// Compute the drift now and keep recomputing it every `interval`.
    ///
    /// Calling this while a sync task is already running stops that task
    /// (and resets drift) instead of starting a second one.
    pub async fn start_time_sync(&self, interval: Duration) -> Result<()> {
        let token = {
            let mut guard = self.time_sync.lock().await;
            if let Some(running) = guard.take() {
                running.cancel();
                self.clock.reset();
                info!("time sync already running; stopped");
                return Ok(());
            }
            let token = CancellationToken::new();
            *guard = Some(token.clone());
            token
        };

        let client = self.clone();
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = client.recalculate_drift().await {
                            warn!(error = %err, "periodic drift recalculation failed");
                        }
                    }
                }
            }
            debug!("time sync task stopped");
        });

        info!(interval_ms = interval.as_millis() as u64, "time sync started");
        self.recalculate_drift().await.map(|_| ())
    }

    /// Stop periodic drift recalculation and reset drift to zero
    pub async fn end_time_sync(&self) {
        if let Some(token) = self.time_sync.lock().await.take() {
            token.cancel();
        }
        self.clock.reset();
    }

    pub async fn is_time_sync_running(&self) -> bool {
        self.time_sync.lock().await.is_some()
    }
}

fn missing_credentials(route: &str, security: SecurityLevel) -> VoptionError {
    VoptionError::MissingCredentials {
        route: route.to_string(),
        security: security.as_str(),
    }
}
