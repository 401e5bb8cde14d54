//! Configuration for pairlens
//!
//! Values come from the environment (and a `.env` file) or from a TOML file;
//! command line flags override both.

use alloy_primitives::Address;
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use url::Url;

/// Public read-only endpoint used when `RPC_URL` is not set
pub const DEFAULT_RPC_URL: &str = "https://ethereum.publicnode.com";

/// Multicall3 (same address on all EVM chains)
pub const DEFAULT_MULTICALL_ADDRESS: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

/// ~1 block
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint all reads go through
    pub rpc_url: String,

    /// Deployed Multicall2/Multicall3 contract
    pub multicall_address: String,

    /// Seconds between refreshes in watch mode
    pub watch_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            rpc_url: env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            multicall_address: env::var("MULTICALL_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_MULTICALL_ADDRESS.to_string()),
            watch_interval_secs: env::var("WATCH_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_WATCH_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_WATCH_INTERVAL_SECS),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .wrap_err_with(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.rpc_endpoint()?;
        self.multicall()?;

        if self.watch_interval_secs == 0 {
            return Err(eyre!("WATCH_INTERVAL_SECS must be at least 1"));
        }

        Ok(())
    }

    pub fn rpc_endpoint(&self) -> Result<Url> {
        Url::parse(&self.rpc_url).wrap_err_with(|| format!("invalid RPC_URL {:?}", self.rpc_url))
    }

    pub fn multicall(&self) -> Result<Address> {
        Address::from_str(&self.multicall_address)
            .wrap_err_with(|| format!("invalid MULTICALL_ADDRESS {:?}", self.multicall_address))
    }

    /// RPC URL without path or query, which usually carry an API key
    pub fn display_rpc_url(&self) -> String {
        match Url::parse(&self.rpc_url) {
            Ok(url) => format!("{}://{}", url.scheme(), url.host_str().unwrap_or("?")),
            Err(_) => "<invalid>".to_string(),
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║                 PAIRLENS - CONFIGURATION                   ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ RPC:               {:<40} ║", self.display_rpc_url());
        println!("║ Multicall:         {:<40} ║", self.multicall_address);
        println!("║ Watch Interval:    {:<40} ║", format!("{}s", self.watch_interval_secs));
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            multicall_address: DEFAULT_MULTICALL_ADDRESS.to_string(),
            watch_interval_secs: DEFAULT_WATCH_INTERVAL_SECS,
        }
    }
}

// ============================================
// TESTS
// ============================================
