//! Live depth cache - keeps a local order book and prints it every 3 seconds
//!
//! Usage:
//!   cargo run --example depth
//!
//! Optional:
//!   DEPTH_SYMBOL=BTCUSDT  # Trading pair (default: ethbtc)
//!   DEPTH_LEVELS=10       # Levels printed per side (default: 10)
//!   BINANCE_ENV=testnet   # Use the spot testnet (default: production)
//!   RUST_LOG=binance_depth_cache=debug

use std::sync::Arc;
use std::time::Duration;

use binance_depth_cache::config::Environment;
use binance_depth_cache::depth::view;
use binance_depth_cache::{BinanceClient, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("binance_depth_cache=info".parse()?),
        )
        .init();

    let symbol = std::env::var("DEPTH_SYMBOL").unwrap_or_else(|_| "ethbtc".to_string());
    let levels = std::env::var("DEPTH_LEVELS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    // Determine environment
    let env = match std::env::var("BINANCE_ENV")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "testnet" => Environment::Testnet,
        _ => Environment::Production,
    };

    println!("=== Binance Depth Cache: {} ===\n", symbol.to_uppercase());

    let client = BinanceClient::new(Config::new(&symbol).with_environment(env))?;
    let cache = Arc::new(client.depth_cache());
    let maintainer = client.maintainer();

    let task_cache = Arc::clone(&cache);
    let mut maintainer_task = tokio::spawn(async move {
        maintainer
            .run(&task_cache, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(3));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = cache.depth(levels);
                println!("{}", view::render(&snapshot, levels));
                if let (Some(mid), Some(spread)) = (view::mid_price(&snapshot), view::spread(&snapshot)) {
                    println!("mid {}  spread {}", mid, spread);
                }
                if let Some(imbalance) = view::imbalance(&snapshot, levels) {
                    println!("imbalance {:.4}", imbalance);
                }
                println!();
            }
            result = &mut maintainer_task => {
                result??;
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
