/*
[INPUT]:  Symbol shorthands or query mappings
[OUTPUT]: Market data (server time, depth, trades, klines, tickers)
[POS]:    HTTP layer - public market data endpoints (no auth, except historical trades)
[UPDATE]: When adding new public endpoints or changing routes
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{QueryArg, QueryParams, Result, VoptionClient};
use crate::types::{Endpoint, Venue};

const PING: Endpoint = Endpoint::public("api/v1/ping");
const OPTION_PING: Endpoint = Endpoint::public("vapi/v1/ping");
const TIME: Endpoint = Endpoint::public("api/v3/time");
const OPTION_TIME: Endpoint = Endpoint::public("vapi/v1/time");
const DEPTH: Endpoint = Endpoint::public("api/v1/depth");
const TRADES: Endpoint = Endpoint::public("api/v1/trades");
const HISTORICAL_TRADES: Endpoint = Endpoint::api_key("api/v1/historicalTrades", Method::GET);
const AGG_TRADES: Endpoint = Endpoint::public("api/v1/aggTrades");
const EXCHANGE_INFO: Endpoint = Endpoint::public("api/v1/exchangeInfo");
const KLINES: Endpoint = Endpoint::public("api/v1/klines");
const TICKER_24HR: Endpoint = Endpoint::public("api/v1/ticker/24hr");
const TICKER_PRICE: Endpoint = Endpoint::public("api/v3/ticker/price");
const BOOK_TICKER: Endpoint = Endpoint::public("api/v3/ticker/bookTicker");
const ALL_BOOK_TICKERS: Endpoint = Endpoint::public("api/v1/ticker/allBookTickers");
const ALL_PRICES: Endpoint = Endpoint::public("api/v1/ticker/allPrices");

impl VoptionClient {
    /// GET api/v1/ping (vapi/v1/ping on the options venue)
    pub async fn ping(&self) -> Result<Value> {
        let endpoint = match self.venue() {
            Venue::Spot => &PING,
            Venue::Options => &OPTION_PING,
        };
        self.call(endpoint, QueryParams::new()).await
    }

    /// GET api/v3/time (vapi/v1/time on the options venue)
    pub async fn time(&self) -> Result<Value> {
        let endpoint = match self.venue() {
            Venue::Spot => &TIME,
            Venue::Options => &OPTION_TIME,
        };
        self.call(endpoint, QueryParams::new()).await
    }

    /// GET api/v1/depth
    pub async fn depth(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&DEPTH, query.into().into_params("symbol")?).await
    }

    /// GET api/v1/trades
    pub async fn trades(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&TRADES, query.into().into_params("symbol")?).await
    }

    /// GET api/v1/historicalTrades (API key)
    pub async fn historical_trades(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&HISTORICAL_TRADES, query.into().into_params("symbol")?)
            .await
    }

    /// GET api/v1/aggTrades
    pub async fn agg_trades(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&AGG_TRADES, query.into().into_params("symbol")?).await
    }

    pub async fn exchange_info(&self) -> Result<Value> {
        self.call(&EXCHANGE_INFO, QueryParams::new()).await
    }

    /// GET api/v1/klines; no shorthand, `symbol` and `interval` are both required
    pub async fn klines(&self, query: impl Into<QueryArg>) -> Result<Value> {
        let params = match query.into() {
            QueryArg::Shorthand(_) => {
                return Err(crate::http::VoptionError::InvalidQuery(
                    "klines needs a mapping with symbol and interval".to_string(),
                ));
            }
            other => other.into_params("symbol")?,
        };
        self.call(&KLINES, params).await
    }

    pub async fn ticker_24hr(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&TICKER_24HR, query.into().into_params("symbol")?).await
    }

    pub async fn ticker_price(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&TICKER_PRICE, query.into().into_params("symbol")?).await
    }

    pub async fn book_ticker(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&BOOK_TICKER, query.into().into_params("symbol")?).await
    }

    pub async fn all_book_tickers(&self) -> Result<Value> {
        self.call(&ALL_BOOK_TICKERS, QueryParams::new()).await
    }

    pub async fn all_prices(&self) -> Result<Value> {
        self.call(&ALL_PRICES, QueryParams::new()).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{Credentials, RestConfig, VoptionClient, VoptionError};
    use crate::types::Venue;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, venue: Venue) -> VoptionClient {
        VoptionClient::with_config(RestConfig {
            base_url: server.uri(),
            venue,
            ..RestConfig::default()
        })
        .expect("client init")
    }

    #[tokio::test]
    async fn test_depth_shorthand_is_unsigned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/depth"))
            .and(query_param("symbol", "BTCUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "lastUpdateId": 1027024,
                "bids": [["4.00000000", "431.00000000"]],
                "asks": [["4.00000200", "12.00000000"]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Venue::Spot);
        let depth = client.depth("BTCUSDT").await.expect("depth failed");

        assert_eq!(depth["bids"][0]["price"], json!("4.00000000"));
        assert_eq!(depth["asks"][0]["quantity"], json!("12.00000000"));

        let requests = server.received_requests().await.expect("recording enabled");
        assert_eq!(requests[0].url.query(), Some("symbol=BTCUSDT"));
        assert!(requests[0].headers.get("X-MBX-APIKEY").is_none());
    }

    #[tokio::test]
    async fn test_time_uses_options_route() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vapi/v1/time"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0, "msg": "success", "data": 1592387156596u64
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Venue::Options);
        let time = client.time().await.expect("time failed");
        assert_eq!(time["data"], json!(1592387156596u64));
    }

    #[tokio::test]
    async fn test_historical_trades_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/historicalTrades"))
            .and(header("X-MBX-APIKEY", "my-key"))
            .and(query_param("symbol", "BTCUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 28457, "price": "4.00000100", "qty": "12.00000000", "quoteQty": "48.000012",
                 "time": 1499865549590u64, "isBuyerMaker": true, "isBestMatch": true}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Venue::Spot).with_credentials(Credentials::new("my-key", "s"));
        let trades = client.historical_trades("BTCUSDT").await.expect("trades failed");

        assert_eq!(trades[0]["quantity"], json!("12.00000000"));
        assert_eq!(trades[0]["buyerMaker"], json!(true));
        let requests = server.received_requests().await.expect("recording enabled");
        assert!(!requests[0].url.as_str().contains("signature"));
    }

    #[tokio::test]
    async fn test_historical_trades_without_key_is_rejected_locally() {
        let server = MockServer::start().await;
        let client = client_for(&server, Venue::Spot);
        let err = client.historical_trades("BTCUSDT").await.unwrap_err();
        assert!(matches!(err, VoptionError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn test_klines_rejects_shorthand() {
        let server = MockServer::start().await;
        let client = client_for(&server, Venue::Spot);
        let err = client.klines("BTCUSDT").await.unwrap_err();
        assert!(matches!(err, VoptionError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_error_status_surfaces_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/depth"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": -1121, "msg": "Invalid symbol."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Venue::Spot);
        match client.depth("NOPE").await {
            Err(VoptionError::Api { status, code, msg, payload }) => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(-1121));
                assert_eq!(msg, "Invalid symbol.");
                assert_eq!(payload["code"], json!(-1121));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
