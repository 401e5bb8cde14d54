//! Batch Aggregator - one `eth_call` to the multicall contract per batch
//!
//! `tryBlockAndAggregate(false, calls)` is available on both Multicall2 and
//! Multicall3. All calls execute inside a single `eth_call`, so they observe the
//! same block, and the contract reports a success flag per call instead of
//! reverting the whole batch.

use super::{abi::IMulticall, codec::EncodedCall, PairError};

use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use std::future::Future;
use std::time::Instant;
use tracing::debug;

/// Raw result of one call inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub success: bool,
    /// Return data when `success`, revert data otherwise
    pub return_data: Bytes,
}

/// Everything one aggregation round returns
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Block the whole batch was executed against
    pub block_number: u64,
    pub block_hash: B256,
    /// `outcomes[i]` belongs to `calls[i]`
    pub outcomes: Vec<CallOutcome>,
}

/// Executes a batch of read calls atomically.
///
/// Implementations must return exactly one outcome per call, in call order.
pub trait Aggregator {
    fn aggregate(
        &self,
        calls: &[EncodedCall],
    ) -> impl Future<Output = Result<BatchOutput, PairError>> + Send;
}

// ============================================
// MULTICALL AGGREGATOR
// ============================================

#[derive(Clone)]
pub struct MulticallAggregator {
    provider: DynProvider,
    multicall: Address,
}

impl MulticallAggregator {
    pub fn new(provider: DynProvider, multicall: Address) -> Self {
        Self {
            provider,
            multicall,
        }
    }

    pub fn multicall_address(&self) -> Address {
        self.multicall
    }
}

impl Aggregator for MulticallAggregator {
    async fn aggregate(&self, calls: &[EncodedCall]) -> Result<BatchOutput, PairError> {
        let start = Instant::now();
        let tx = aggregate_request(self.multicall, calls);

        let result = self.provider.call(tx).await?;

        let decoded = IMulticall::tryBlockAndAggregateCall::abi_decode_returns_validate(&result)
            .map_err(|e| {
                PairError::AggregationResponse(format!("failed to decode multicall result: {e}"))
            })?;

        let outcomes = collect_outcomes(calls.len(), decoded.returnData)?;
        let block_number = decoded.blockNumber.saturating_to::<u64>();

        debug!(
            "Multicall: {} calls at block {} ({}) in {:?} ({} failed)",
            calls.len(),
            block_number,
            decoded.blockHash,
            start.elapsed(),
            outcomes.iter().filter(|o| !o.success).count()
        );

        Ok(BatchOutput {
            block_number,
            block_hash: decoded.blockHash,
            outcomes,
        })
    }
}

/// Build the `eth_call` request for one batch
pub fn aggregate_request(multicall: Address, calls: &[EncodedCall]) -> TransactionRequest {
    let calls = calls
        .iter()
        .map(|call| IMulticall::Call {
            target: call.target,
            callData: call.call_data.clone(),
        })
        .collect();

    let calldata = IMulticall::tryBlockAndAggregateCall {
        requireSuccess: false,
        calls,
    }
    .abi_encode();

    TransactionRequest::default()
        .to(multicall)
        .input(calldata.into())
}

/// Check the result count and convert to [`CallOutcome`]s, keeping order
fn collect_outcomes(
    expected: usize,
    results: Vec<IMulticall::Result>,
) -> Result<Vec<CallOutcome>, PairError> {
    if results.len() != expected {
        return Err(PairError::AggregationResponse(format!(
            "{} results for {} calls",
            results.len(),
            expected
        )));
    }

    Ok(results
        .into_iter()
        .map(|r| CallOutcome {
            success: r.success,
            return_data: r.returnData,
        })
        .collect())
}

// ============================================
// TESTS
// ============================================
