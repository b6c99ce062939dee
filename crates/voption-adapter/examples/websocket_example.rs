/*
[INPUT]:  Option contract list from the REST client
[OUTPUT]: Live option tickers printed for a few seconds
[POS]:    Examples - WebSocket stream handling
[UPDATE]: When WebSocket API changes
*/

use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};
use voption_adapter::*;

/// Example: every option ticker over one combined stream
#[tokio::main]
async fn main() {
    println!("=== Options WebSocket Example ===\n");

    let rest = match VoptionClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    let ws = VoptionWebSocket::new();
    let (tx, mut rx) = mpsc::channel(256);

    if let Err(e) = ws.subscribe_all_tickers(&rest, tx).await {
        eprintln!("✗ Subscribe failed: {}", e);
        return;
    }
    println!("✓ Subscribed to all option tickers\n");

    let deadline = Duration::from_secs(5);
    while let Ok(Some(event)) = timeout(deadline, rx.recv()).await {
        match event {
            StreamEvent::Json(value) => println!("{} {}", value["data"]["symbol"], value["data"]["markPrice"]),
            StreamEvent::Raw(text) => println!("raw: {}", text),
        }
    }

    ws.shutdown().await;
    println!("\n✓ WebSocket example complete");
}
