/*
[INPUT]:  WebSocket test scenarios against a local push server
[OUTPUT]: Test results for the streaming client
[POS]:    Integration tests - WebSocket
[UPDATE]: When WebSocket client changes
*/

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    StreamServer, TEST_API_KEY, rest_config, setup_mock_server, signed_client,
    start_stalled_listener,
};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_test::assert_ok;
use voption_adapter::ws::PLAINTEXT_MODE_REQUEST;
use voption_adapter::{StreamConfig, StreamEvent, VoptionError, VoptionWebSocket};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

async fn next_event(rx: &mut mpsc::Receiver<StreamEvent>) -> StreamEvent {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("event within timeout")
        .expect("channel open")
}

async fn mount_listen_key(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/vapi/v1/userDataStream"))
        .and(header("X-MBX-APIKEY", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "success",
            "data": {"listenKey": "listen-key-1", "expiration": 1762}
        })))
        .mount(server)
        .await;
}

#[test]
fn test_websocket_default() {
    let ws: VoptionWebSocket = Default::default();
    assert!(ws.config().plaintext_handshake);
    assert!(ws.config().normalize);
    assert_eq!(ws.config().connect_timeout, Duration::from_secs(10));
}

#[tokio::test]
async fn test_same_path_reuses_one_connection() {
    let stream_server = StreamServer::start(Vec::new()).await;
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx1, _rx1) = mpsc::channel(8);
    let (tx2, _rx2) = mpsc::channel(8);

    let first = assert_ok!(ws.on_trade("BTCUSDT", tx1).await);
    let second = assert_ok!(ws.subscribe("btcusdt@trade", false, tx2).await);

    assert!(first.same_connection(&second));
    assert_eq!(stream_server.accepted(), 1);
    assert_eq!(ws.open_connections().await, 1);
    assert_eq!(stream_server.paths(), vec!["/ws/btcusdt@trade".to_string()]);
}

#[tokio::test]
async fn test_closed_connection_is_replaced_on_resubscribe() {
    let stream_server = StreamServer::start(Vec::new()).await;
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx, _rx) = mpsc::channel(8);

    let first = assert_ok!(ws.on_depth("BTCUSDT", tx.clone()).await);
    first.close();
    assert!(first.is_closed());
    assert_eq!(ws.open_connections().await, 0);

    let second = assert_ok!(ws.on_depth("BTCUSDT", tx).await);
    assert!(!first.same_connection(&second));
    assert_eq!(stream_server.accepted(), 2);
}

#[tokio::test]
async fn test_plaintext_handshake_is_sent_on_connect() {
    let stream_server = StreamServer::start(Vec::new()).await;
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx, _rx) = mpsc::channel(8);

    assert_ok!(ws.on_ticker("BTC-220930-18000-C", tx).await);

    let received = stream_server.wait_received(1).await;
    assert_eq!(received, vec![PLAINTEXT_MODE_REQUEST.to_string()]);
}

#[tokio::test]
async fn test_handshake_can_be_disabled() {
    let stream_server = StreamServer::start(Vec::new()).await;
    let config = StreamConfig {
        plaintext_handshake: false,
        ..stream_server.stream_config()
    };
    let ws = VoptionWebSocket::with_config(config);
    let (tx, _rx) = mpsc::channel(8);

    assert_ok!(ws.on_trade("BTCUSDT", tx).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(stream_server.wait_received(1).await.is_empty());
}

#[tokio::test]
async fn test_ack_dropped_and_data_frames_normalized() {
    let frames = vec![
        r#"{"result":null,"id":1}"#.to_string(),
        r#"{"stream":"BTC-220930-18000-C@trade","data":{"e":"trade","s":"BTC-220930-18000-C","p":"1000","q":"1"}}"#.to_string(),
    ];
    let stream_server = StreamServer::start(frames).await;
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx, mut rx) = mpsc::channel(8);

    assert_ok!(ws.on_trade("BTC-220930-18000-C", tx).await);

    let event = next_event(&mut rx).await;
    let value = event.as_json().expect("json event");
    assert_eq!(value["stream"], json!("BTC-220930-18000-C@trade"));
    assert_eq!(value["data"]["eventType"], json!("trade"));
    assert_eq!(value["data"]["symbol"], json!("BTC-220930-18000-C"));
    assert_eq!(value["data"]["price"], json!("1000"));
}

#[tokio::test]
async fn test_unparseable_frame_is_passed_raw() {
    let stream_server = StreamServer::start(vec!["pong from server".to_string()]).await;
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx, mut rx) = mpsc::channel(8);

    assert_ok!(ws.on_trade("BTCUSDT", tx).await);

    assert_eq!(
        next_event(&mut rx).await,
        StreamEvent::Raw("pong from server".to_string())
    );
}

#[tokio::test]
async fn test_keep_alive_stops_after_invalid_listen_key() {
    let stream_server = StreamServer::start(Vec::new()).await;
    let rest_server = setup_mock_server().await;
    mount_listen_key(&rest_server).await;
    Mock::given(method("PUT"))
        .and(path("/vapi/v1/userDataStream"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -1125,
            "msg": "This listenKey does not exist.",
        })))
        .expect(1)
        .mount(&rest_server)
        .await;

    let rest = signed_client(rest_config(&rest_server));
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx, _rx) = mpsc::channel(8);

    let handle = assert_ok!(
        ws.subscribe_user_data_with_interval(&rest, tx, Duration::from_millis(50))
            .await
    );
    assert!(handle.url().ends_with("/ws/listen-key-1"));

    tokio::time::sleep(Duration::from_millis(300)).await;

    let status = ws.user_data_status().await.expect("session recorded");
    assert_eq!(status.listen_key, "listen-key-1");
    assert_eq!(status.fail_count, 1);
    assert!(!status.active);
}

#[tokio::test]
async fn test_keep_alive_continues_after_other_failures() {
    let stream_server = StreamServer::start(Vec::new()).await;
    let rest_server = setup_mock_server().await;
    mount_listen_key(&rest_server).await;
    Mock::given(method("PUT"))
        .and(path("/vapi/v1/userDataStream"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": -1001,
            "msg": "Internal error; unable to process your request. Please try again.",
        })))
        .mount(&rest_server)
        .await;

    let rest = signed_client(rest_config(&rest_server));
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx, _rx) = mpsc::channel(8);

    assert_ok!(
        ws.subscribe_user_data_with_interval(&rest, tx, Duration::from_millis(50))
            .await
    );
    tokio::time::sleep(Duration::from_millis(300)).await;

    let status = ws.user_data_status().await.expect("session recorded");
    assert!(status.active);
    assert!(status.fail_count >= 2);

    ws.close_user_data().await;
    assert!(ws.user_data_status().await.is_none());
}

#[tokio::test]
async fn test_all_tickers_uses_one_combined_connection() {
    let stream_server = StreamServer::start(Vec::new()).await;
    let rest_server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/vapi/v1/optionInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "success",
            "data": [
                {"id": 1, "symbol": "BTC-220930-18000-C", "underlying": "BTCUSDT"},
                {"id": 2, "symbol": "BTC-220930-18000-P", "underlying": "BTCUSDT"}
            ]
        })))
        .mount(&rest_server)
        .await;

    let rest = assert_ok!(voption_adapter::VoptionClient::with_config(rest_config(
        &rest_server
    )));
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx, _rx) = mpsc::channel(8);

    assert_ok!(ws.subscribe_all_tickers(&rest, tx).await);

    assert_eq!(stream_server.accepted(), 1);
    assert_eq!(
        stream_server.paths(),
        vec!["/stream?streams=BTC-220930-18000-C@ticker/BTC-220930-18000-P@ticker".to_string()]
    );
}

#[tokio::test]
async fn test_all_tickers_without_contracts_fails() {
    let stream_server = StreamServer::start(Vec::new()).await;
    let rest_server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/vapi/v1/optionInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "success",
            "data": []
        })))
        .mount(&rest_server)
        .await;

    let rest = assert_ok!(voption_adapter::VoptionClient::with_config(rest_config(
        &rest_server
    )));
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (tx, _rx) = mpsc::channel(8);

    let err = ws.subscribe_all_tickers(&rest, tx).await.unwrap_err();
    assert!(matches!(err, VoptionError::InvalidResponse(_)));
    assert_eq!(stream_server.accepted(), 0);
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    let config = StreamConfig {
        base_url: "ws://127.0.0.1:1/ws/".to_string(),
        ..StreamConfig::default()
    };
    let ws = VoptionWebSocket::with_config(config);
    let (tx, _rx) = mpsc::channel(8);

    let err = ws.on_trade("BTCUSDT", tx).await.unwrap_err();
    assert!(matches!(err, VoptionError::WebSocket(_)));
    assert_eq!(ws.open_connections().await, 0);
}

#[tokio::test]
async fn test_full_handler_does_not_block_resubscribe() {
    let frames = (1..=3)
        .map(|n| format!(r#"{{"stream":"btcusdt@trade","data":{{"e":"trade","s":"BTCUSDT","t":{n}}}}}"#))
        .collect();
    let stream_server = StreamServer::start(frames).await;
    let ws = VoptionWebSocket::with_config(stream_server.stream_config());
    let (slow_tx, mut slow_rx) = mpsc::channel(1);
    let (fast_tx, _fast_rx) = mpsc::channel(8);

    let first = assert_ok!(ws.on_trade("BTCUSDT", slow_tx).await);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = timeout(RECV_TIMEOUT, ws.subscribe("btcusdt@trade", false, fast_tx))
        .await
        .expect("resubscribe while a handler is full");
    let second = assert_ok!(second);
    assert!(first.same_connection(&second));

    for _ in 0..3 {
        next_event(&mut slow_rx).await;
    }
}

#[tokio::test]
async fn test_stalled_upgrade_times_out() {
    let stalled = start_stalled_listener().await;
    let config = StreamConfig {
        base_url: format!("ws://{stalled}/ws/"),
        connect_timeout: Duration::from_millis(200),
        ..StreamConfig::default()
    };
    let ws = VoptionWebSocket::with_config(config);
    let (tx, _rx) = mpsc::channel(8);

    let outcome = timeout(RECV_TIMEOUT, ws.on_trade("BTCUSDT", tx))
        .await
        .expect("connect bounded by connect_timeout");
    assert!(matches!(outcome, Err(VoptionError::WebSocket(_))));
    assert_eq!(ws.open_connections().await, 0);
}

#[tokio::test]
async fn test_stalled_upgrade_does_not_block_other_paths() {
    let stalled = start_stalled_listener().await;
    let stream_server = StreamServer::start(Vec::new()).await;
    let config = StreamConfig {
        base_url: format!("ws://{stalled}/ws/"),
        connect_timeout: Duration::from_secs(30),
        ..stream_server.stream_config()
    };
    let ws = Arc::new(VoptionWebSocket::with_config(config));

    let stuck = {
        let ws = ws.clone();
        tokio::spawn(async move {
            let (tx, _rx) = mpsc::channel(8);
            ws.on_trade("BTCUSDT", tx).await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (tx, _rx) = mpsc::channel(8);
    let names = vec!["BTC-220930-18000-C@ticker".to_string()];
    let combined = timeout(RECV_TIMEOUT, ws.on_combined_stream(&names, tx))
        .await
        .expect("combined subscribe not held up");
    assert_ok!(combined);

    let open = timeout(RECV_TIMEOUT, ws.open_connections())
        .await
        .expect("registry not held up");
    assert_eq!(open, 1);
    assert!(!stuck.is_finished());
    stuck.abort();
}

#[tokio::test]
async fn test_user_data_connect_failure_starts_no_keep_alive() {
    let rest_server = setup_mock_server().await;
    mount_listen_key(&rest_server).await;
    Mock::given(method("PUT"))
        .and(path("/vapi/v1/userDataStream"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "msg": "success"})))
        .expect(0)
        .mount(&rest_server)
        .await;

    let rest = signed_client(rest_config(&rest_server));
    let config = StreamConfig {
        base_url: "ws://127.0.0.1:1/ws/".to_string(),
        ..StreamConfig::default()
    };
    let ws = VoptionWebSocket::with_config(config);
    let (tx, _rx) = mpsc::channel(8);

    let err = ws
        .subscribe_user_data_with_interval(&rest, tx, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, VoptionError::WebSocket(_)));
    assert!(ws.user_data_status().await.is_none());

    tokio::time::sleep(Duration::from_millis(250)).await;
    let requests = rest_server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|request| request.method.as_str() != "PUT"));
}
