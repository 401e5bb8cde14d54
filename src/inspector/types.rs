use alloy_primitives::{
    utils::{format_units, UnitsError},
    Address, U256,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Decimals used to scale the LP token supply.
///
/// Assumption: every Uniswap V2 pair mints an 18-decimal LP token, so the
/// pair's own `decimals()` is never queried.
pub const LP_TOKEN_DECIMALS: u8 = 18;

/// One side of the pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Raw reserve scaled by `decimals`
    pub reserve: f64,
}

/// Unscaled reserves exactly as `getReserves()` reported them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reserves {
    pub reserve0: String,
    pub reserve1: String,
    pub block_timestamp_last: u32,
}

impl Reserves {
    /// Time of the last reserve update
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::from(self.block_timestamp_last), 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    /// As supplied by the caller
    pub pair_address: String,
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    pub reserves: Reserves,
    /// LP supply scaled by [`LP_TOKEN_DECIMALS`]
    pub total_supply: f64,
    pub total_supply_raw: String,
    /// Block the reserves and supply were read at
    pub block_number: u64,
}

impl PairRecord {
    /// Spot price of token0 in units of token1
    pub fn token0_price(&self) -> Option<f64> {
        (self.token0.reserve > 0.0).then(|| self.token1.reserve / self.token0.reserve)
    }

    /// Spot price of token1 in units of token0
    pub fn token1_price(&self) -> Option<f64> {
        (self.token1.reserve > 0.0).then(|| self.token0.reserve / self.token1.reserve)
    }
}

/// `raw / 10^decimals` as a float.
///
/// Goes through the exact decimal string so the only rounding is the final
/// conversion to `f64`.
pub fn scale_units(raw: U256, decimals: u8) -> Result<f64, UnitsError> {
    let formatted = format_units(raw, decimals)?;

    // format_units only emits ASCII digits with at most one '.'
    Ok(formatted.parse::<f64>().unwrap_or_default())
}

// ============================================
// TESTS
// ============================================
