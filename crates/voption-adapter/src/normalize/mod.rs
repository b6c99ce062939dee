/*
[INPUT]:  Raw exchange JSON plus a route type or stream event type tag
[OUTPUT]: Payloads with stable, documented field names
[POS]:    Normalize layer - pure response reshaping shared by REST and streams
[UPDATE]: When adding payload kinds or changing envelope handling
*/

//! Table-driven payload normalization.
//!
//! A tag (the last route segment for REST, the `e` field for stream events)
//! is looked up into a [`PayloadKind`]; each kind maps to a static [`Shape`].
//! Unknown tags resolve to [`PayloadKind::Identity`] and the payload is
//! returned untouched.

pub mod schema;

use serde_json::{Map, Value};

use schema::{Schema, Shape};

/// Normalization selected for one payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Identity,
    Depth,
    AggTrades,
    Klines,
    Trades,
    DepthUpdateEvent,
    OptionDepthEvent,
    AggTradeEvent,
    TradeEvent,
    KlineEvent,
    TickerEvent,
    AccountInfoEvent,
    ExecutionReportEvent,
}

const ROUTE_KINDS: &[(&str, PayloadKind)] = &[
    ("depth", PayloadKind::Depth),
    ("aggTrades", PayloadKind::AggTrades),
    ("klines", PayloadKind::Klines),
    ("trades", PayloadKind::Trades),
    ("historicalTrades", PayloadKind::Trades),
];

const EVENT_KINDS: &[(&str, PayloadKind)] = &[
    ("depthUpdate", PayloadKind::DepthUpdateEvent),
    ("depth", PayloadKind::OptionDepthEvent),
    ("aggTrade", PayloadKind::AggTradeEvent),
    ("trade", PayloadKind::TradeEvent),
    ("kline", PayloadKind::KlineEvent),
    ("24hrTicker", PayloadKind::TickerEvent),
    ("outboundAccountInfo", PayloadKind::AccountInfoEvent),
    ("executionReport", PayloadKind::ExecutionReportEvent),
];

impl PayloadKind {
    /// Kind for a REST route type (last path segment)
    pub fn for_route(route_type: &str) -> Self {
        lookup(ROUTE_KINDS, route_type)
    }

    /// Kind for a stream event type (`e` field)
    pub fn for_event(event_type: &str) -> Self {
        lookup(EVENT_KINDS, event_type)
    }

    pub fn shape(self) -> Option<Shape> {
        let shape = match self {
            PayloadKind::Identity => return None,
            PayloadKind::Depth => Shape::Fields(&schema::DEPTH),
            PayloadKind::AggTrades => Shape::Fields(&schema::AGG_TRADES),
            PayloadKind::Klines => Shape::Columns(schema::KLINE_COLUMNS),
            PayloadKind::Trades => Shape::Fields(&schema::TRADES),
            PayloadKind::DepthUpdateEvent => Shape::Fields(&schema::DEPTH_UPDATE_EVENT),
            PayloadKind::OptionDepthEvent => Shape::Fields(&schema::OPTION_DEPTH_EVENT),
            PayloadKind::AggTradeEvent => Shape::Fields(&schema::AGG_TRADE_EVENT),
            PayloadKind::TradeEvent => Shape::Fields(&schema::TRADE_EVENT),
            PayloadKind::KlineEvent => Shape::Fields(&schema::KLINE_EVENT),
            PayloadKind::TickerEvent => Shape::Fields(&schema::TICKER_EVENT),
            PayloadKind::AccountInfoEvent => Shape::Fields(&schema::ACCOUNT_INFO_EVENT),
            PayloadKind::ExecutionReportEvent => {
                Shape::Fields(&schema::EXECUTION_REPORT_EVENT)
            }
        };
        Some(shape)
    }
}

fn lookup(table: &[(&str, PayloadKind)], tag: &str) -> PayloadKind {
    table
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, kind)| *kind)
        .unwrap_or(PayloadKind::Identity)
}

/// Normalize a payload with an explicit kind.
///
/// Sequences are normalized element-wise. An options envelope
/// (`{code, msg, data}`) only has its `data` reshaped.
pub fn normalize(payload: Value, kind: PayloadKind) -> Value {
    let Some(shape) = kind.shape() else {
        return payload;
    };
    match payload {
        Value::Object(mut map) if is_envelope(&map) => {
            if let Some(data) = map.remove("data") {
                map.insert("data".to_string(), apply(shape, data));
            }
            Value::Object(map)
        }
        other => apply(shape, other),
    }
}

/// Normalize a REST response keyed by its route (last path segment selects the kind)
pub fn normalize_route(payload: Value, route: &str) -> Value {
    let route_type = crate::types::route_type(route);
    normalize(payload, PayloadKind::for_route(route_type))
}

/// Normalize one inbound stream payload.
///
/// Combined-stream envelopes (`{stream, data}`) keep their own fields and
/// only `data` is reshaped, using the inner event type.
pub fn normalize_stream(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key("stream") && map.contains_key("data") => {
            if let Some(data) = map.remove("data") {
                map.insert("data".to_string(), normalize_events(data));
            }
            Value::Object(map)
        }
        other => normalize_events(other),
    }
}

fn normalize_events(payload: Value) -> Value {
    match payload {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_event).collect()),
        other => normalize_event(other),
    }
}

fn normalize_event(event: Value) -> Value {
    let kind = event
        .get("e")
        .and_then(Value::as_str)
        .map(PayloadKind::for_event)
        .unwrap_or(PayloadKind::Identity);
    normalize(event, kind)
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key("code") && map.contains_key("data")
}

fn apply(shape: Shape, value: Value) -> Value {
    match (shape, value) {
        (Shape::Fields(schema), Value::Array(items)) => Value::Array(
            items
                .into_iter()
                .map(|item| apply(Shape::Fields(schema), item))
                .collect(),
        ),
        (Shape::Fields(schema), Value::Object(map)) => Value::Object(rename(schema, map)),
        (Shape::Columns(columns), Value::Array(items)) => {
            if items.is_empty() || items.first().is_some_and(Value::is_array) {
                Value::Array(
                    items
                        .into_iter()
                        .map(|item| apply(Shape::Columns(columns), item))
                        .collect(),
                )
            } else {
                Value::Object(zip_columns(columns, items))
            }
        }
        (_, other) => other,
    }
}

fn rename(schema: &Schema, map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        let name = schema
            .fields
            .iter()
            .find(|(raw, _)| *raw == key)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or(key);
        let value = match schema.nested.iter().find(|(field, _)| *field == name) {
            Some((_, nested)) => apply(*nested, value),
            None => value,
        };
        out.insert(name, value);
    }
    out
}

fn zip_columns(columns: &[&str], items: Vec<Value>) -> Map<String, Value> {
    columns
        .iter()
        .zip(items)
        .map(|(column, value)| ((*column).to_string(), value))
        .collect()
}
