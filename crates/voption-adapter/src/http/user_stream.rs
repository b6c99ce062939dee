/*
[INPUT]:  Listen keys issued by the exchange
[OUTPUT]: User-data stream session lifecycle (start, keep-alive, close)
[POS]:    HTTP layer - user data stream endpoints (API key)
[UPDATE]: When listen-key routes or response shapes change
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{QueryParams, Result, VoptionClient, VoptionError};
use crate::types::{Endpoint, Venue};

const START: Endpoint = Endpoint::api_key("api/v3/userDataStream", Method::POST);
const KEEP_ALIVE: Endpoint = Endpoint::api_key("api/v1/userDataStream", Method::PUT);
const CLOSE: Endpoint = Endpoint::api_key("api/v1/userDataStream", Method::DELETE);
const OPTION_START: Endpoint = Endpoint::api_key("vapi/v1/userDataStream", Method::POST);
const OPTION_KEEP_ALIVE: Endpoint = Endpoint::api_key("vapi/v1/userDataStream", Method::PUT);
const OPTION_CLOSE: Endpoint = Endpoint::api_key("vapi/v1/userDataStream", Method::DELETE);

impl VoptionClient {
    /// POST userDataStream - opens a session and returns the raw response
    pub async fn start_user_data_stream(&self) -> Result<Value> {
        let mut params = QueryParams::new();
        let endpoint = match self.venue() {
            Venue::Spot => &START,
            Venue::Options => {
                params.insert("timestamp", self.clock().current_timestamp());
                &OPTION_START
            }
        };
        self.call(endpoint, params).await
    }

    /// Open a session and extract its listen key
    pub async fn start_listen_key(&self) -> Result<String> {
        let response = self.start_user_data_stream().await?;
        listen_key_from(&response).ok_or_else(|| {
            VoptionError::InvalidResponse(format!("listenKey missing in {response}"))
        })
    }

    /// PUT userDataStream - extends the session
    pub async fn keep_alive_user_data_stream(&self, listen_key: &str) -> Result<Value> {
        let endpoint = match self.venue() {
            Venue::Spot => &KEEP_ALIVE,
            Venue::Options => &OPTION_KEEP_ALIVE,
        };
        self.call(endpoint, listen_key_params(listen_key)).await
    }

    /// DELETE userDataStream - ends the session
    pub async fn close_user_data_stream(&self, listen_key: &str) -> Result<Value> {
        let endpoint = match self.venue() {
            Venue::Spot => &CLOSE,
            Venue::Options => &OPTION_CLOSE,
        };
        self.call(endpoint, listen_key_params(listen_key)).await
    }
}

fn listen_key_params(listen_key: &str) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert("listenKey", listen_key);
    params
}

/// `listenKey` at the top level (spot) or inside the options `data` envelope
pub fn listen_key_from(response: &Value) -> Option<String> {
    response
        .get("listenKey")
        .or_else(|| response.get("data").and_then(|data| data.get("listenKey")))
        .and_then(Value::as_str)
        .map(str::to_string)
}
