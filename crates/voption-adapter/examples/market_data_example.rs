/*
[INPUT]:  Underlying and option contract symbols
[OUTPUT]: Option contract list, index price, mark price and depth
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints
*/

use voption_adapter::*;

/// Example: Query options market data (no credentials required)
#[tokio::main]
async fn main() {
    println!("=== Options Market Data Example ===\n");

    let client = match VoptionClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };

    match client.time().await {
        Ok(time) => println!("✓ Server time: {}", time),
        Err(e) => println!("✗ Error: {}", e),
    }

    match client.option_index("BTCUSDT").await {
        Ok(index) => println!("✓ Index: {}", index),
        Err(e) => println!("✗ Error: {}", e),
    }

    let info = match client.option_info().await {
        Ok(info) => info,
        Err(e) => {
            println!("✗ Error: {}", e);
            return;
        }
    };
    let Some(symbol) = info["data"][0]["symbol"].as_str() else {
        println!("✗ No listed contracts");
        return;
    };
    println!("✓ First listed contract: {}", symbol);

    match client.option_mark(symbol).await {
        Ok(mark) => println!("✓ Mark: {}", mark),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Market data example complete");
}
