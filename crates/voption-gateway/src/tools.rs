/*
[INPUT]:  Option contract list from the optionInfo endpoint
[OUTPUT]: Expiry dates, strike prices and trade pairs per expiry
[POS]:    Helper layer - pure option chain reshaping
[UPDATE]: When the contract symbol format changes
*/

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Symbols of one expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePairs {
    pub expiry_date: u32,
    pub trade_pairs: Vec<String>,
}

/// Six-digit expiry (`YYMMDD`) of a contract symbol such as `BTC-220930-18000-C`
pub fn expiry_of(symbol: &str) -> Option<u32> {
    symbol.split('-').nth(1)?.parse().ok()
}

fn contract_expiry(contract: &Value) -> Option<u32> {
    contract.get("symbol").and_then(Value::as_str).and_then(expiry_of)
}

/// Strike prices arrive as strings or numbers
fn strike_of(contract: &Value) -> Option<Decimal> {
    match contract.get("strikePrice")? {
        Value::String(raw) => Decimal::from_str(raw.trim()).ok(),
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        _ => None,
    }
}

/// Distinct expiries, ascending
pub fn all_expiry_dates(contracts: &[Value]) -> Vec<u32> {
    let mut dates: Vec<u32> = contracts.iter().filter_map(contract_expiry).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Distinct strike prices listed for `expiry_date`, ascending
pub fn all_strike_prices(expiry_date: u32, contracts: &[Value]) -> Vec<Decimal> {
    let mut strikes: Vec<Decimal> = contracts
        .iter()
        .filter(|contract| contract_expiry(contract) == Some(expiry_date))
        .filter_map(strike_of)
        .collect();
    strikes.sort();
    strikes.dedup();
    strikes
}

/// Every contract symbol listed for `expiry_date`, in listing order
pub fn all_trade_pairs(expiry_date: u32, contracts: &[Value]) -> TradePairs {
    let trade_pairs = contracts
        .iter()
        .filter(|contract| contract_expiry(contract) == Some(expiry_date))
        .filter_map(|contract| contract.get("symbol").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    TradePairs {
        expiry_date,
        trade_pairs,
    }
}

/// Expiry from a request body value (`220930` or `"220930"`)
pub fn parse_expiry(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}
