//! Build a reconnect policy from a JSON config section.

use relink::prelude::*;
use relink_cookbook::MemoryDriver;

const CONFIG: &str = r#"{
    "initial_interval_ms": 100,
    "multiplier": 2.0,
    "max_interval_ms": 2000,
    "jitter": "equal",
    "max_attempts": 6
}"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config: ReconnectConfig = serde_json::from_str(CONFIG)?;
    println!("config: {config:?}");
    let policy = config.into_policy()?;
    println!("policy: {policy:?}");

    let cancel = CancellationToken::new();
    let mut conn = ResilientConnection::builder(MemoryDriver::new(), "memory://demo")
        .policy(policy)
        .connect(&cancel)
        .await?;
    conn.ping(&cancel).await?;
    println!("connected to {}", conn.target());
    Ok(())
}
