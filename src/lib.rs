//! PairLens - Uniswap V2 pair inspection
//!
//! Shared by the `pairlens` CLI and the `diagnose` tool.

pub mod config;
pub mod context;
pub mod display;
pub mod inspector;
pub mod state;
