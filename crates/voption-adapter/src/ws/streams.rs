/*
[INPUT]:  Symbols, depth levels and kline intervals
[OUTPUT]: Push-stream names understood by the exchange
[POS]:    WebSocket layer - stream path builders
[UPDATE]: When the exchange adds stream types
*/

pub fn depth(symbol: &str) -> String {
    format!("{}@depth", symbol.to_lowercase())
}

pub fn depth_level(symbol: &str, level: u32) -> String {
    format!("{}@depth{level}", symbol.to_lowercase())
}

pub fn kline(symbol: &str, interval: &str) -> String {
    format!("{}@kline_{interval}", symbol.to_lowercase())
}

pub fn agg_trade(symbol: &str) -> String {
    format!("{}@aggTrade", symbol.to_lowercase())
}

pub fn trade(symbol: &str) -> String {
    format!("{}@trade", symbol.to_lowercase())
}

/// Option symbols keep their case on ticker streams
pub fn ticker(symbol: &str) -> String {
    format!("{symbol}@ticker")
}

pub fn all_tickers() -> String {
    "!ticker@arr".to_string()
}

/// Path for a combined stream over several stream names
pub fn combined(streams: &[String]) -> String {
    streams.join("/")
}
