//! Pairing Terminal Example
//!
//! Starts a relay channel for a fresh pairing session, prints the URL to
//! render as the pairing code, and streams operator notices and state
//! changes to the terminal.
//!
//! Run: cargo run --example pairing_terminal -- http://localhost:8080

use std::sync::Arc;

use scanner_link::{ChannelConfig, ChannelEvent, HttpCatalog, RelayChannel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let origin = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let config = ChannelConfig::new(&origin);
    let catalog = Arc::new(HttpCatalog::new(config.catalog_base()));
    let handle = RelayChannel::new(config, catalog).connect();

    println!("\nScan to pair: {}", handle.pairing_url());
    println!("Session id:   {}\n", handle.session().session_id());

    let mut notices = handle.notices();
    let mut events = handle.events();
    let order = handle.order();

    loop {
        tokio::select! {
            notice = notices.recv() => {
                let Ok(notice) = notice else { break };
                println!("[{}] {}: {}", notice.level, notice.title, notice.message);
            }
            event = events.recv() => {
                let Ok(event) = event else { break };
                match event {
                    ChannelEvent::State(state) => println!("channel: {state}"),
                    ChannelEvent::Scanner(status) => println!("scanner: {status}"),
                }
                let order = order.lock().unwrap();
                if !order.is_empty() {
                    println!("order total: {} ({} lines)", order.total(), order.lines().len());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nclosing channel");
                handle.close();
                break;
            }
        }
    }

    handle.join().await;
    Ok(())
}
