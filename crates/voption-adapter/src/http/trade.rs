/*
[INPUT]:  Order query mappings (symbol, side, type, quantity, ...)
[OUTPUT]: Order acknowledgements, order state and fills
[POS]:    HTTP layer - spot trading endpoints (SIGNED)
[UPDATE]: When adding new trading endpoints or changing order routes
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{QueryArg, Result, VoptionClient};
use crate::types::Endpoint;

const NEW_ORDER: Endpoint = Endpoint::signed("api/v3/order", Method::POST);
const TEST_ORDER: Endpoint = Endpoint::signed("api/v3/order/test", Method::POST);
const QUERY_ORDER: Endpoint = Endpoint::signed("api/v3/order", Method::GET);
const CANCEL_ORDER: Endpoint = Endpoint::signed("api/v3/order", Method::DELETE);
const OPEN_ORDERS: Endpoint = Endpoint::signed("api/v3/openOrders", Method::GET);
const ALL_ORDERS: Endpoint = Endpoint::signed("api/v3/allOrders", Method::GET);
const MY_TRADES: Endpoint = Endpoint::signed("api/v3/myTrades", Method::GET);

impl VoptionClient {
    /// POST api/v3/order
    pub async fn new_order(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&NEW_ORDER, query.into().into_params("symbol")?).await
    }

    /// POST api/v3/order/test - validated by the exchange, never placed
    pub async fn test_order(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&TEST_ORDER, query.into().into_params("symbol")?).await
    }

    /// GET api/v3/order
    pub async fn query_order(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&QUERY_ORDER, query.into().into_params("symbol")?).await
    }

    /// DELETE api/v3/order
    pub async fn cancel_order(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&CANCEL_ORDER, query.into().into_params("symbol")?).await
    }

    pub async fn open_orders(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPEN_ORDERS, query.into().into_params("symbol")?).await
    }

    pub async fn all_orders(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&ALL_ORDERS, query.into().into_params("symbol")?).await
    }

    pub async fn my_trades(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&MY_TRADES, query.into().into_params("symbol")?).await
    }
}
