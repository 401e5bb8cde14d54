//! Application context: owns the provider handle and hands out resolvers.

use crate::config::Config;
use crate::inspector::{MulticallAggregator, PairResolver};

use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use eyre::Result;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

pub struct AppContext {
    rpc_url: Url,
    multicall: Address,
    provider: OnceLock<DynProvider>,
}

impl AppContext {
    /// Validates the endpoint and multicall address; does not touch the network
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            rpc_url: config.rpc_endpoint()?,
            multicall: config.multicall()?,
            provider: OnceLock::new(),
        })
    }

    /// The shared read-only provider, built on first use.
    ///
    /// Building an HTTP provider opens no connection, so an unreachable
    /// endpoint only shows up on the first actual request.
    pub fn provider(&self) -> &DynProvider {
        self.provider.get_or_init(|| {
            debug!("Creating provider for {}", self.rpc_url.host_str().unwrap_or("?"));
            ProviderBuilder::new()
                .connect_http(self.rpc_url.clone())
                .erased()
        })
    }

    pub fn multicall_address(&self) -> Address {
        self.multicall
    }

    pub fn resolver(&self) -> PairResolver<MulticallAggregator> {
        PairResolver::new(MulticallAggregator::new(
            self.provider().clone(),
            self.multicall,
        ))
    }
}

// ============================================
// TESTS
// ============================================
