//! Pair Resolver - two multicall rounds per pair
//!
//! Round 1 reads `token0`, `token1`, `getReserves` and `totalSupply` from the
//! pair. Round 2 reads `name`, `symbol` and `decimals` from both tokens found in
//! round 1. Reserves are only ever read in round 1, so the scaled and raw
//! reserve values of a record always come from the same block.

use super::{
    abi::{IERC20Metadata, IUniswapV2Pair},
    codec::{decode_result, encode_call, encode_call_at},
    multicall::{Aggregator, BatchOutput, CallOutcome},
    types::{scale_units, PairRecord, Reserves, TokenInfo, LP_TOKEN_DECIMALS},
    PairError,
};

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use std::time::Instant;
use tracing::{debug, info};

// Round 1 layout
const TOKEN0_CALL: usize = 0;
const TOKEN1_CALL: usize = 1;
const RESERVES_CALL: usize = 2;
const SUPPLY_CALL: usize = 3;

// Round 2 layout: token `i` occupies `i * 3 ..= i * 3 + 2`
const TOKEN_CALLS: usize = 3;
const NAME_OFFSET: usize = 0;
const SYMBOL_OFFSET: usize = 1;
const DECIMALS_OFFSET: usize = 2;

/// Pair-level facts from round 1
#[derive(Debug, Clone)]
struct PairFacts {
    token0: Address,
    token1: Address,
    reserve0: U256,
    reserve1: U256,
    block_timestamp_last: u32,
    total_supply: U256,
    block_number: u64,
}

/// Token-level facts from round 2
#[derive(Debug, Clone)]
struct TokenMetadata {
    name: String,
    symbol: String,
    decimals: u8,
}

pub struct PairResolver<A> {
    aggregator: A,
}

impl<A: Aggregator> PairResolver<A> {
    pub fn new(aggregator: A) -> Self {
        Self { aggregator }
    }

    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }

    /// Resolve everything about one pair.
    ///
    /// Any failure aborts the whole resolution; there is no partial record and
    /// no retry.
    pub async fn resolve_pair(&self, pair_address: &str) -> Result<PairRecord, PairError> {
        if pair_address.trim().is_empty() {
            return Err(PairError::EmptyAddress);
        }

        let start = Instant::now();

        let pair = self.fetch_pair_facts(pair_address).await?;
        let [meta0, meta1] = self.fetch_token_metadata(pair.token0, pair.token1).await?;

        let reserve0 = scale_token_reserve(pair.reserve0, 0, &meta0)?;
        let reserve1 = scale_token_reserve(pair.reserve1, 1, &meta1)?;
        let total_supply = scale_units(pair.total_supply, LP_TOKEN_DECIMALS).map_err(|e| {
            PairError::Decoding {
                index: SUPPLY_CALL,
                function: IUniswapV2Pair::totalSupplyCall::SIGNATURE,
                reason: e.to_string(),
            }
        })?;

        info!(
            "Resolved {} ({}/{}) at block {} in {:?}",
            pair_address,
            meta0.symbol,
            meta1.symbol,
            pair.block_number,
            start.elapsed()
        );

        Ok(PairRecord {
            pair_address: pair_address.to_string(),
            token0: TokenInfo {
                address: pair.token0,
                name: meta0.name,
                symbol: meta0.symbol,
                decimals: meta0.decimals,
                reserve: reserve0,
            },
            token1: TokenInfo {
                address: pair.token1,
                name: meta1.name,
                symbol: meta1.symbol,
                decimals: meta1.decimals,
                reserve: reserve1,
            },
            reserves: Reserves {
                reserve0: pair.reserve0.to_string(),
                reserve1: pair.reserve1.to_string(),
                block_timestamp_last: pair.block_timestamp_last,
            },
            total_supply,
            total_supply_raw: pair.total_supply.to_string(),
            block_number: pair.block_number,
        })
    }

    async fn fetch_pair_facts(&self, pair_address: &str) -> Result<PairFacts, PairError> {
        let calls = vec![
            encode_call_at(pair_address, &IUniswapV2Pair::token0Call {})?,
            encode_call_at(pair_address, &IUniswapV2Pair::token1Call {})?,
            encode_call_at(pair_address, &IUniswapV2Pair::getReservesCall {})?,
            encode_call_at(pair_address, &IUniswapV2Pair::totalSupplyCall {})?,
        ];

        let batch = self.aggregator.aggregate(&calls).await?;
        debug!(
            "Round 1: {} pair calls at block {} ({})",
            calls.len(),
            batch.block_number,
            batch.block_hash
        );

        let token0 =
            decode_result::<IUniswapV2Pair::token0Call>(TOKEN0_CALL, outcome(&batch, TOKEN0_CALL)?)?;
        let token1 =
            decode_result::<IUniswapV2Pair::token1Call>(TOKEN1_CALL, outcome(&batch, TOKEN1_CALL)?)?;
        let reserves = decode_result::<IUniswapV2Pair::getReservesCall>(
            RESERVES_CALL,
            outcome(&batch, RESERVES_CALL)?,
        )?;
        let total_supply = decode_result::<IUniswapV2Pair::totalSupplyCall>(
            SUPPLY_CALL,
            outcome(&batch, SUPPLY_CALL)?,
        )?;

        Ok(PairFacts {
            token0,
            token1,
            reserve0: U256::from(reserves.reserve0),
            reserve1: U256::from(reserves.reserve1),
            block_timestamp_last: reserves.blockTimestampLast,
            total_supply,
            block_number: batch.block_number,
        })
    }

    async fn fetch_token_metadata(
        &self,
        token0: Address,
        token1: Address,
    ) -> Result<[TokenMetadata; 2], PairError> {
        let calls: Vec<_> = [token0, token1]
            .into_iter()
            .flat_map(|token| {
                [
                    encode_call(token, &IERC20Metadata::nameCall {}),
                    encode_call(token, &IERC20Metadata::symbolCall {}),
                    encode_call(token, &IERC20Metadata::decimalsCall {}),
                ]
            })
            .collect();

        let batch = self.aggregator.aggregate(&calls).await?;
        debug!("Round 2: {} token calls at block {}", calls.len(), batch.block_number);

        Ok([
            decode_token_metadata(&batch, 0)?,
            decode_token_metadata(&batch, 1)?,
        ])
    }
}

fn outcome(batch: &BatchOutput, index: usize) -> Result<&CallOutcome, PairError> {
    batch.outcomes.get(index).ok_or_else(|| {
        PairError::AggregationResponse(format!(
            "missing result #{} ({} results)",
            index,
            batch.outcomes.len()
        ))
    })
}

fn decode_token_metadata(batch: &BatchOutput, token: usize) -> Result<TokenMetadata, PairError> {
    let base = token * TOKEN_CALLS;
    let name_idx = base + NAME_OFFSET;
    let symbol_idx = base + SYMBOL_OFFSET;
    let decimals_idx = base + DECIMALS_OFFSET;

    Ok(TokenMetadata {
        name: decode_result::<IERC20Metadata::nameCall>(name_idx, outcome(batch, name_idx)?)?,
        symbol: decode_result::<IERC20Metadata::symbolCall>(symbol_idx, outcome(batch, symbol_idx)?)?,
        decimals: decode_result::<IERC20Metadata::decimalsCall>(
            decimals_idx,
            outcome(batch, decimals_idx)?,
        )?,
    })
}

fn scale_token_reserve(raw: U256, token: usize, meta: &TokenMetadata) -> Result<f64, PairError> {
    scale_units(raw, meta.decimals).map_err(|e| PairError::Decoding {
        index: token * TOKEN_CALLS + DECIMALS_OFFSET,
        function: IERC20Metadata::decimalsCall::SIGNATURE,
        reason: format!("unusable decimals {}: {}", meta.decimals, e),
    })
}

// ============================================
// TESTS
// ============================================
