/*
[INPUT]:  Raw WebSocket text frames
[OUTPUT]: StreamEvent values for handlers (normalized JSON or raw text)
[POS]:    WebSocket layer - frame parsing, filtering and normalization
[UPDATE]: When changing frame filtering or parse fallback
*/

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use crate::normalize::normalize_stream;
use crate::types::StreamEvent;

/// Control request asking the push service for uncompressed text frames
pub const PLAINTEXT_MODE_REQUEST: &str = r#"{"method":"BINARY","params":["false"],"id":1}"#;

const PARSE_FAIL_LOG_LIMIT: usize = 3;
const DROPPED_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

static PARSE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static DROPPED_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Turn one text frame into an event for the handlers.
///
/// Structured frames without a `data` field (the control acknowledgement
/// `{"result":null,"id":1}` and the like) yield `None`. Frames that fail to
/// parse are passed through as [`StreamEvent::Raw`].
pub fn parse_frame(text: &str, normalize: bool) -> Option<StreamEvent> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            if value.get("data").is_none() {
                log_dropped_once(text);
                return None;
            }
            let value = if normalize {
                normalize_stream(value)
            } else {
                value
            };
            Some(StreamEvent::Json(value))
        }
        Err(err) => {
            log_parse_fail_once(&err, text);
            Some(StreamEvent::Raw(text.to_string()))
        }
    }
}

fn log_dropped_once(raw: &str) {
    let count = DROPPED_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < DROPPED_LOG_LIMIT {
        debug!(
            sample_index = count + 1,
            sample_limit = DROPPED_LOG_LIMIT,
            message = %truncate_for_log(raw, RAW_LOG_MAX_BYTES),
            "ws frame without data skipped"
        );
    }
}

fn log_parse_fail_once(err: &serde_json::Error, raw: &str) {
    let count = PARSE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < PARSE_FAIL_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            bytes = raw.len(),
            "ws message parse failed; passing raw text"
        );
        debug!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            message = %truncate_for_log(raw, RAW_LOG_MAX_BYTES),
            "ws message parse failed"
        );
    }
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_control_ack_is_skipped() {
        assert_eq!(parse_frame(r#"{"result":null,"id":1}"#, true), None);
        assert_eq!(parse_frame(r#"{"id":1}"#, false), None);
    }

    #[test]
    fn test_malformed_frame_passes_through_raw() {
        assert_eq!(
            parse_frame("not json {", true),
            Some(StreamEvent::Raw("not json {".to_string()))
        );
    }

    #[test]
    fn test_combined_frame_is_normalized() {
        let frame = r#"{"stream":"BTC-220930-18000-C@trade","data":{"e":"trade","s":"BTC-220930-18000-C","p":"1000","q":"1"}}"#;
        let event = parse_frame(frame, true).expect("event");
        let value = event.as_json().expect("json");
        assert_eq!(value["stream"], json!("BTC-220930-18000-C@trade"));
        assert_eq!(value["data"]["price"], json!("1000"));
        assert_eq!(value["data"]["eventType"], json!("trade"));
    }

    #[test]
    fn test_normalization_can_be_disabled() {
        let frame = r#"{"stream":"x@trade","data":{"e":"trade","p":"1000"}}"#;
        let event = parse_frame(frame, false).expect("event");
        assert_eq!(event.as_json().unwrap()["data"]["p"], json!("1000"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        assert_eq!(truncate_for_log("abc", 10), "abc");
        assert_eq!(truncate_for_log("héllo", 2), "h...");
    }
}
