/*
[INPUT]:  Exchange wire field names (short keys, positional arrays)
[OUTPUT]: Static rename tables and column layouts per payload kind
[POS]:    Normalize layer - schema tables
[UPDATE]: When the exchange adds fields or a new payload kind is mapped
*/

/// How one payload (or one nested value) is reshaped
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Rename object keys; unknown keys are kept as-is
    Fields(&'static Schema),
    /// Turn a positional array into an object with these keys
    Columns(&'static [&'static str]),
}

/// Field renames plus shapes for nested values (keyed by the renamed field)
#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [(&'static str, &'static str)],
    pub nested: &'static [(&'static str, Shape)],
}

pub const LEVEL_COLUMNS: &[&str] = &["price", "quantity"];

pub const KLINE_COLUMNS: &[&str] = &[
    "openTime",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "closeTime",
    "quoteAssetVolume",
    "trades",
    "takerBaseAssetVolume",
    "takerQuoteAssetVolume",
    "ignored",
];

pub static DEPTH: Schema = Schema {
    fields: &[],
    nested: &[
        ("bids", Shape::Columns(LEVEL_COLUMNS)),
        ("asks", Shape::Columns(LEVEL_COLUMNS)),
    ],
};

pub static AGG_TRADES: Schema = Schema {
    fields: &[
        ("a", "tradeId"),
        ("p", "price"),
        ("q", "quantity"),
        ("f", "firstTradeId"),
        ("l", "lastTradeId"),
        ("T", "timestamp"),
        ("m", "maker"),
        ("M", "bestPriceMatch"),
    ],
    nested: &[],
};

pub static TRADES: Schema = Schema {
    fields: &[
        ("qty", "quantity"),
        ("quoteQty", "quoteQuantity"),
        ("isBuyerMaker", "buyerMaker"),
        ("isBestMatch", "bestPriceMatch"),
    ],
    nested: &[],
};

pub static DEPTH_UPDATE_EVENT: Schema = Schema {
    fields: &[
        ("e", "eventType"),
        ("E", "eventTime"),
        ("s", "symbol"),
        ("U", "firstUpdateId"),
        ("u", "lastUpdateId"),
        ("b", "bidDepthDelta"),
        ("a", "askDepthDelta"),
    ],
    nested: &[
        ("bidDepthDelta", Shape::Columns(LEVEL_COLUMNS)),
        ("askDepthDelta", Shape::Columns(LEVEL_COLUMNS)),
    ],
};

pub static OPTION_DEPTH_EVENT: Schema = Schema {
    fields: &[
        ("e", "eventType"),
        ("E", "eventTime"),
        ("T", "transactionTime"),
        ("s", "symbol"),
        ("u", "updateId"),
        ("pu", "previousUpdateId"),
        ("b", "bids"),
        ("a", "asks"),
    ],
    nested: &[
        ("bids", Shape::Columns(LEVEL_COLUMNS)),
        ("asks", Shape::Columns(LEVEL_COLUMNS)),
    ],
};

pub static AGG_TRADE_EVENT: Schema = Schema {
    fields: &[
        ("e", "eventType"),
        ("E", "eventTime"),
        ("s", "symbol"),
        ("a", "tradeId"),
        ("p", "price"),
        ("q", "quantity"),
        ("f", "firstTradeId"),
        ("l", "lastTradeId"),
        ("T", "time"),
        ("m", "maker"),
        ("M", "ignored"),
    ],
    nested: &[],
};

pub static TRADE_EVENT: Schema = Schema {
    fields: &[
        ("e", "eventType"),
        ("E", "eventTime"),
        ("s", "symbol"),
        ("t", "tradeId"),
        ("p", "price"),
        ("q", "quantity"),
        ("b", "buyerOrderId"),
        ("a", "sellerOrderId"),
        ("T", "time"),
        ("S", "side"),
        ("m", "maker"),
        ("M", "ignored"),
    ],
    nested: &[],
};

static KLINE: Schema = Schema {
    fields: &[
        ("t", "startTime"),
        ("T", "endTime"),
        ("s", "symbol"),
        ("i", "interval"),
        ("f", "firstTradeId"),
        ("L", "lastTradeId"),
        ("o", "open"),
        ("c", "close"),
        ("h", "high"),
        ("l", "low"),
        ("v", "volume"),
        ("n", "trades"),
        ("x", "final"),
        ("q", "quoteVolume"),
        ("V", "volumeActive"),
        ("Q", "quoteVolumeActive"),
        ("B", "ignored"),
    ],
    nested: &[],
};

pub static KLINE_EVENT: Schema = Schema {
    fields: &[
        ("e", "eventType"),
        ("E", "eventTime"),
        ("s", "symbol"),
        ("k", "kline"),
    ],
    nested: &[("kline", Shape::Fields(&KLINE))],
};

/// Options 24h ticker, greeks included
pub static TICKER_EVENT: Schema = Schema {
    fields: &[
        ("e", "eventType"),
        ("E", "eventTime"),
        ("T", "transactionTime"),
        ("s", "symbol"),
        ("o", "open"),
        ("h", "high"),
        ("l", "low"),
        ("c", "close"),
        ("V", "volume"),
        ("A", "amount"),
        ("P", "priceChangePercent"),
        ("p", "priceChange"),
        ("Q", "lastTradeVolume"),
        ("F", "firstTradeId"),
        ("L", "lastTradeId"),
        ("n", "tradeCount"),
        ("bo", "bestBuyPrice"),
        ("ao", "bestSellPrice"),
        ("bq", "bestBuyQuantity"),
        ("aq", "bestSellQuantity"),
        ("b", "buyImpliedVolatility"),
        ("a", "sellImpliedVolatility"),
        ("d", "delta"),
        ("t", "theta"),
        ("g", "gamma"),
        ("v", "vega"),
        ("vo", "impliedVolatility"),
        ("mp", "markPrice"),
        ("hl", "buyMaxPrice"),
        ("ll", "sellMinPrice"),
        ("eep", "estimatedExercisePrice"),
    ],
    nested: &[],
};

static BALANCE: Schema = Schema {
    fields: &[
        ("a", "asset"),
        ("f", "availableBalance"),
        ("l", "onOrderBalance"),
    ],
    nested: &[],
};

pub static ACCOUNT_INFO_EVENT: Schema = Schema {
    fields: &[
        ("e", "eventType"),
        ("E", "eventTime"),
        ("m", "makerCommission"),
        ("t", "takerCommission"),
        ("b", "buyerCommission"),
        ("s", "sellerCommission"),
        ("T", "canTrade"),
        ("W", "canWithdraw"),
        ("D", "canDeposit"),
        ("u", "lastUpdateTime"),
        ("B", "balances"),
    ],
    nested: &[("balances", Shape::Fields(&BALANCE))],
};

pub static EXECUTION_REPORT_EVENT: Schema = Schema {
    fields: &[
        ("e", "eventType"),
        ("E", "eventTime"),
        ("s", "symbol"),
        ("c", "newClientOrderId"),
        ("S", "side"),
        ("o", "orderType"),
        ("f", "timeInForce"),
        ("q", "quantity"),
        ("p", "price"),
        ("P", "stopPrice"),
        ("F", "icebergQuantity"),
        ("g", "orderListId"),
        ("C", "originalClientOrderId"),
        ("x", "executionType"),
        ("X", "orderStatus"),
        ("r", "rejectReason"),
        ("i", "orderId"),
        ("l", "lastTradeQuantity"),
        ("z", "accumulatedQuantity"),
        ("L", "lastTradePrice"),
        ("n", "commission"),
        ("N", "commissionAsset"),
        ("T", "tradeTime"),
        ("t", "tradeId"),
        ("w", "isOrderWorking"),
        ("m", "maker"),
        ("O", "orderCreationTime"),
        ("Z", "cumulativeQuoteQuantity"),
        ("Y", "lastQuoteQuantity"),
    ],
    nested: &[],
};
