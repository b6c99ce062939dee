/*
[INPUT]:  Gateway HTTP requests and the shared REST client
[OUTPUT]: `{code, message}` envelopes for every route
[POS]:    Server layer - HTTP front controller
[UPDATE]: When adding routes or changing the response envelope
*/

//! HTTP front controller using axum.
//!
//! Every route answers `200 OK` with a `{code, message}` envelope: `code` is
//! 200 on success and 0 on failure.

use anyhow::Context;
use axum::Router;
use axum::extract::{Form, FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::Json;
use axum::routing::{get, post};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use voption_adapter::http::INVALID_SIGNATURE;
use voption_adapter::{VoptionClient, VoptionError};

use crate::tools;

pub const CODE_OK: u16 = 200;
pub const CODE_FAILED: u16 = 0;

const WELCOME: &str = "Welcome to the options gateway";
const SIGNATURE_EXPIRED_ORDER: &str = "Signature expired, please place the order again";
const SIGNATURE_EXPIRED_REFRESH: &str = "Signature expired, please refresh";

/// Response envelope shared by every route
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub code: u16,
    pub message: Value,
}

impl Envelope {
    fn ok(message: impl Serialize) -> Json<Self> {
        match serde_json::to_value(message) {
            Ok(message) => Json(Self {
                code: CODE_OK,
                message,
            }),
            Err(err) => Self::failed(err.to_string()),
        }
    }

    fn failed(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            code: CODE_FAILED,
            message: Value::String(message.into()),
        })
    }
}

/// Request body as a field map, read from JSON or a urlencoded form.
///
/// Bodies that fail to parse are answered with a failed envelope.
pub struct BodyFields(pub Map<String, Value>);

impl<S> FromRequest<S> for BodyFields
where
    S: Send + Sync,
{
    type Rejection = Json<Envelope>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| Envelope::failed(rejection.body_text()))?;
            Ok(Self(
                pairs
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
            ))
        } else {
            let Json(fields) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|rejection| Envelope::failed(rejection.body_text()))?;
            Ok(Self(fields))
        }
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    rest: VoptionClient,
}

impl AppState {
    pub fn new(rest: VoptionClient) -> Self {
        Self { rest }
    }

    pub fn rest(&self) -> &VoptionClient {
        &self.rest
    }

    /// Contract list of the optionInfo response
    async fn contracts(&self) -> Result<Vec<Value>, VoptionError> {
        let info = self.rest.option_info().await?;
        exchange_data(info)?
            .as_array()
            .cloned()
            .ok_or_else(|| VoptionError::InvalidResponse("optionInfo data is not a list".into()))
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/binance/voption/info", get(option_info))
        .route("/binance/voption/expiryDate", get(expiry_dates))
        .route("/binance/voption/strikePrice", post(strike_prices))
        .route("/binance/voption/newOrder", post(new_order))
        .route("/binance/voption/currentPosition", get(current_position))
        .route("/binance/voption/tradePairs", post(trade_pairs))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `listen_addr` and serve until `shutdown` is cancelled.
pub async fn run_server(
    listen_addr: &str,
    state: AppState,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("bind {listen_addr}"))?;
    info!(addr = %listen_addr, "gateway listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("serve gateway")
}

async fn welcome() -> Json<Envelope> {
    Envelope::ok(WELCOME)
}

async fn option_info(State(state): State<AppState>) -> Json<Envelope> {
    match state.rest.option_info().await.and_then(exchange_data) {
        Ok(data) => Envelope::ok(data),
        Err(err) => failure("optionInfo", err, None),
    }
}

async fn expiry_dates(State(state): State<AppState>) -> Json<Envelope> {
    match state.contracts().await {
        Ok(contracts) => Envelope::ok(tools::all_expiry_dates(&contracts)),
        Err(err) => failure("expiryDate", err, None),
    }
}

async fn strike_prices(
    State(state): State<AppState>,
    BodyFields(body): BodyFields,
) -> Json<Envelope> {
    let Some(expiry) = requested_expiry(&body) else {
        return Envelope::failed("expiryDate must be a YYMMDD number");
    };
    match state.contracts().await {
        Ok(contracts) => Envelope::ok(tools::all_strike_prices(expiry, &contracts)),
        Err(err) => failure("strikePrice", err, None),
    }
}

async fn trade_pairs(
    State(state): State<AppState>,
    BodyFields(body): BodyFields,
) -> Json<Envelope> {
    let Some(expiry) = requested_expiry(&body) else {
        return Envelope::failed("expiryDate must be a YYMMDD number");
    };
    match state.contracts().await {
        Ok(contracts) => Envelope::ok(tools::all_trade_pairs(expiry, &contracts)),
        Err(err) => failure("tradePairs", err, None),
    }
}

async fn new_order(
    State(state): State<AppState>,
    BodyFields(body): BodyFields,
) -> Json<Envelope> {
    let symbol = body.get("symbol").and_then(Value::as_str).unwrap_or_default().to_string();
    match state.rest.option_new_order(body).await.and_then(exchange_data) {
        Ok(order) => {
            info!(symbol = %symbol, "option order accepted");
            Envelope::ok(order)
        }
        Err(err) => failure("newOrder", err, Some(SIGNATURE_EXPIRED_ORDER)),
    }
}

async fn current_position(State(state): State<AppState>) -> Json<Envelope> {
    match state.rest.option_position(()).await.and_then(exchange_data) {
        Ok(positions) => Envelope::ok(positions),
        Err(err) => failure("currentPosition", err, Some(SIGNATURE_EXPIRED_REFRESH)),
    }
}

fn requested_expiry(body: &Map<String, Value>) -> Option<u32> {
    body.get("expiryDate").and_then(tools::parse_expiry)
}

/// `data` of an options envelope; a non-zero `code` is an exchange rejection
fn exchange_data(payload: Value) -> Result<Value, VoptionError> {
    let code = payload.get("code").and_then(Value::as_i64);
    match code {
        Some(0) | None => Ok(match payload {
            Value::Object(mut fields) if fields.contains_key("data") => {
                fields.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        }),
        Some(code) => {
            let msg = payload
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Err(VoptionError::Api {
                status: 200,
                code: Some(code),
                msg,
                payload,
            })
        }
    }
}

fn failure(route: &str, err: VoptionError, signature_message: Option<&str>) -> Json<Envelope> {
    match &err {
        VoptionError::Api { code, msg, .. } => {
            warn!(route, code = ?code, msg = %msg, "exchange rejected request");
            match signature_message {
                Some(friendly) if *code == Some(INVALID_SIGNATURE) => Envelope::failed(friendly),
                _ => Envelope::failed(msg.clone()),
            }
        }
        _ => {
            error!(route, error = %err, "gateway request failed");
            Envelope::failed("error")
        }
    }
}
