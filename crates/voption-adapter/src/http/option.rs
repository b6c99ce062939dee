/*
[INPUT]:  Option symbols (e.g. BTC-220930-18000-C), underlyings or query mappings
[OUTPUT]: Option contract info, index/mark prices, account, positions, orders
[POS]:    HTTP layer - options market endpoints (vapi/v1)
[UPDATE]: When adding options endpoints or changing routes
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{QueryArg, QueryParams, Result, VoptionClient};
use crate::types::Endpoint;

const OPTION_INFO: Endpoint = Endpoint::public("vapi/v1/optionInfo");
const OPTION_INDEX: Endpoint = Endpoint::public("vapi/v1/index");
const OPTION_MARK: Endpoint = Endpoint::public("vapi/v1/mark");
const OPTION_ACCOUNT: Endpoint = Endpoint::signed("vapi/v1/account", Method::GET);
const OPTION_POSITION: Endpoint = Endpoint::signed("vapi/v1/position", Method::GET);
const OPTION_OPEN_ORDERS: Endpoint = Endpoint::signed("vapi/v1/openOrders", Method::GET);
const OPTION_NEW_ORDER: Endpoint = Endpoint::signed("vapi/v1/order", Method::POST);
const OPTION_DELETE_ORDER: Endpoint = Endpoint::signed("vapi/v1/order", Method::DELETE);
const OPTION_USER_TRADES: Endpoint = Endpoint::signed("vapi/v1/userTrades", Method::GET);

impl VoptionClient {
    /// GET vapi/v1/optionInfo - every listed option contract
    pub async fn option_info(&self) -> Result<Value> {
        self.call(&OPTION_INFO, QueryParams::new()).await
    }

    /// GET vapi/v1/index - spot index price of an underlying
    pub async fn option_index(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPTION_INDEX, query.into().into_params("underlying")?)
            .await
    }

    /// GET vapi/v1/mark - latest mark price
    pub async fn option_mark(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPTION_MARK, query.into().into_params("symbol")?).await
    }

    /// GET vapi/v1/account - option account assets
    pub async fn option_account(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPTION_ACCOUNT, query.into().into_params("currency")?)
            .await
    }

    /// GET vapi/v1/position
    pub async fn option_position(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPTION_POSITION, query.into().into_params("symbol")?)
            .await
    }

    /// GET vapi/v1/openOrders
    pub async fn option_current_orders(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPTION_OPEN_ORDERS, query.into().into_params("symbol")?)
            .await
    }

    /// POST vapi/v1/order
    pub async fn option_new_order(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPTION_NEW_ORDER, query.into().into_params("symbol")?)
            .await
    }

    /// DELETE vapi/v1/order
    pub async fn option_delete_order(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPTION_DELETE_ORDER, query.into().into_params("symbol")?)
            .await
    }

    /// GET vapi/v1/userTrades
    pub async fn option_history_trades(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&OPTION_USER_TRADES, query.into().into_params("symbol")?)
            .await
    }
}
