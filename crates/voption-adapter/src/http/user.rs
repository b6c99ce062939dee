/*
[INPUT]:  Asset shorthands or query mappings
[OUTPUT]: Account balances, wallet history and deposit addresses
[POS]:    HTTP layer - account and wallet endpoints (SIGNED)
[UPDATE]: When adding new account/wallet endpoints
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{QueryArg, QueryParams, Result, VoptionClient};
use crate::types::Endpoint;

const ACCOUNT: Endpoint = Endpoint::signed("api/v3/account", Method::GET);
const WITHDRAW: Endpoint = Endpoint::signed("wapi/v3/withdraw.html", Method::POST);
const DEPOSIT_HISTORY: Endpoint = Endpoint::signed("wapi/v3/depositHistory.html", Method::GET);
const WITHDRAW_HISTORY: Endpoint = Endpoint::signed("wapi/v3/withdrawHistory.html", Method::GET);
const DEPOSIT_ADDRESS: Endpoint = Endpoint::signed("wapi/v3/depositAddress.html", Method::GET);
const DEPOSIT_ADDRESS_WITH_NETWORK: Endpoint =
    Endpoint::signed("sapi/v1/capital/deposit/hisrec", Method::GET);
const ALL_COINS_INFORMATION: Endpoint =
    Endpoint::signed("sapi/v1/capital/config/getall", Method::GET);
const ACCOUNT_STATUS: Endpoint = Endpoint::signed("wapi/v3/accountStatus.html", Method::GET);

impl VoptionClient {
    /// GET api/v3/account
    pub async fn account(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&ACCOUNT, query.into().into_params("symbol")?).await
    }

    /// POST wapi/v3/withdraw.html
    pub async fn withdraw(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&WITHDRAW, query.into().into_params("asset")?).await
    }

    pub async fn deposit_history(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&DEPOSIT_HISTORY, query.into().into_params("asset")?)
            .await
    }

    pub async fn withdraw_history(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&WITHDRAW_HISTORY, query.into().into_params("asset")?)
            .await
    }

    pub async fn deposit_address(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&DEPOSIT_ADDRESS, query.into().into_params("asset")?)
            .await
    }

    /// GET sapi/v1/capital/deposit/hisrec
    pub async fn deposit_address_with_network(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(
            &DEPOSIT_ADDRESS_WITH_NETWORK,
            query.into().into_params("asset")?,
        )
        .await
    }

    pub async fn all_coins_information(&self, query: impl Into<QueryArg>) -> Result<Value> {
        self.call(&ALL_COINS_INFORMATION, query.into().into_params("asset")?)
            .await
    }

    pub async fn account_status(&self) -> Result<Value> {
        self.call(&ACCOUNT_STATUS, QueryParams::new()).await
    }
}
