//! Diagnostic tool - Check RPC and Multicall setup
//!
//! Run with: cargo run --bin diagnose

use alloy_provider::{Provider, ProviderBuilder};
use eyre::Result;
use pairlens::config::{
    Config, DEFAULT_MULTICALL_ADDRESS, DEFAULT_RPC_URL, DEFAULT_WATCH_INTERVAL_SECS,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    println!("🔍 PAIRLENS DIAGNOSTIC CHECK\n");

    // Loads .env too
    let config = Config::from_env()?;
    let default_interval = DEFAULT_WATCH_INTERVAL_SECS.to_string();

    println!("═══════════════════════════════════════════════════");
    println!("                  CONFIGURATION                     ");
    println!("═══════════════════════════════════════════════════\n");

    let checks = [
        ("RPC_URL", DEFAULT_RPC_URL, "JSON-RPC endpoint"),
        ("MULTICALL_ADDRESS", DEFAULT_MULTICALL_ADDRESS, "Multicall2/3 contract"),
        (
            "WATCH_INTERVAL_SECS",
            default_interval.as_str(),
            "Seconds between refreshes in watch mode",
        ),
    ];

    for (key, default, desc) in checks {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let is_default = env::var(key).is_err();
        let marker = if is_default { "(default)" } else { "(from .env)" };
        let shown = if key == "RPC_URL" { config.display_rpc_url() } else { value };
        println!("  {}: {} {}", key, shown, marker);
        println!("    └─ {}\n", desc);
    }

    let multicall = config.multicall()?;

    println!("═══════════════════════════════════════════════════");
    println!("                   CONNECTIVITY                     ");
    println!("═══════════════════════════════════════════════════\n");

    let provider = ProviderBuilder::new().connect_http(config.rpc_endpoint()?);

    let mut healthy = true;

    match provider.get_block_number().await {
        Ok(block) => println!("  📡 RPC:       ✅ connected, current block {}", block),
        Err(e) => {
            healthy = false;
            println!("  📡 RPC:       ❌ {}", e);
        }
    }

    match provider.get_code_at(multicall).await {
        Ok(code) if !code.is_empty() => {
            println!("  📦 Multicall: ✅ deployed ({} bytes)", code.len())
        }
        Ok(_) => {
            healthy = false;
            println!("  📦 Multicall: ❌ no contract at {}", multicall);
        }
        Err(e) => {
            healthy = false;
            println!("  📦 Multicall: ❌ {}", e);
        }
    }

    if healthy {
        println!("\n✅ Diagnostic complete!\n");
    } else {
        println!("\n⚠️  Pair lookups will fail until the issues above are fixed.\n");
    }

    Ok(())
}
