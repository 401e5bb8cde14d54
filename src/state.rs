//! Fetch state holder
//!
//! Tracks idle / loading / ready / failed for the most recent fetch. Every
//! fetch gets a monotonically increasing request id; a completion whose id is
//! no longer the latest is dropped, so a slow stale request can never
//! overwrite a newer one.

use crate::inspector::{Aggregator, PairError, PairRecord, PairResolver};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Prefix of every user facing fetch error
pub const ERROR_PREFIX: &str = "Failed to fetch pair data";

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading { pair_address: String },
    Ready(PairRecord),
    Failed(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn record(&self) -> Option<&PairRecord> {
        match self {
            Self::Ready(record) => Some(record),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

struct StoreInner {
    latest: u64,
    state: FetchState,
}

pub struct PairDataStore {
    next_request: AtomicU64,
    inner: Mutex<StoreInner>,
}

impl Default for PairDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PairDataStore {
    pub fn new() -> Self {
        Self {
            next_request: AtomicU64::new(1),
            inner: Mutex::new(StoreInner {
                latest: 0,
                state: FetchState::Idle,
            }),
        }
    }

    pub fn state(&self) -> FetchState {
        self.lock().state.clone()
    }

    /// Resolve `pair_address` and record the outcome.
    ///
    /// Blank input is ignored and leaves the current state untouched. Returns
    /// the state after the fetch settled, which belongs to a newer fetch if one
    /// started in the meantime.
    pub async fn fetch<A: Aggregator>(
        &self,
        resolver: &PairResolver<A>,
        pair_address: &str,
    ) -> FetchState {
        if pair_address.trim().is_empty() {
            return self.state();
        }

        let ticket = self.begin(pair_address);
        let result = resolver.resolve_pair(pair_address).await;
        ticket.settle(result);

        self.state()
    }

    /// Start a fetch: the previous record or error is dropped right away
    fn begin(&self, pair_address: &str) -> FetchTicket<'_> {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);

        let mut inner = self.lock();
        inner.latest = request_id;
        inner.state = FetchState::Loading {
            pair_address: pair_address.to_string(),
        };

        FetchTicket {
            store: self,
            request_id,
            settled: false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One in-flight fetch. Dropping it unsettled (e.g. the fetch future was
/// cancelled) clears the loading state.
struct FetchTicket<'a> {
    store: &'a PairDataStore,
    request_id: u64,
    settled: bool,
}

impl FetchTicket<'_> {
    /// Returns false when a newer fetch started meanwhile and the result was discarded
    fn settle(mut self, result: Result<PairRecord, PairError>) -> bool {
        self.settled = true;

        let mut inner = self.store.lock();
        if inner.latest != self.request_id {
            debug!(
                "Discarding stale fetch #{} (latest is #{})",
                self.request_id, inner.latest
            );
            return false;
        }

        inner.state = match result {
            Ok(record) => FetchState::Ready(record),
            Err(e) => {
                warn!("Fetch #{} failed: {}", self.request_id, e);
                if e.is_aggregation() {
                    warn!("Multicall unreachable, check RPC_URL and MULTICALL_ADDRESS");
                }
                FetchState::Failed(format!("{ERROR_PREFIX}: {e}"))
            }
        };
        true
    }
}

impl Drop for FetchTicket<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut inner = self.store.lock();
        if inner.latest == self.request_id && inner.state.is_loading() {
            inner.state = FetchState::Idle;
        }
    }
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::{BatchOutput, EncodedCall, Reserves, TokenInfo};
    use alloy_primitives::Address;

    /// Aggregator with no network behind it
    struct Offline;

    impl Aggregator for Offline {
        async fn aggregate(&self, _calls: &[EncodedCall]) -> Result<BatchOutput, PairError> {
            Err(PairError::AggregationResponse("offline".to_string()))
        }
    }

    fn token(symbol: &str) -> TokenInfo {
        TokenInfo {
            address: Address::ZERO,
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            decimals: 18,
            reserve: 1.0,
        }
    }

    fn record(pair_address: &str) -> PairRecord {
        PairRecord {
            pair_address: pair_address.to_string(),
            token0: token("AAA"),
            token1: token("BBB"),
            reserves: Reserves {
                reserve0: "1000000000000000000".to_string(),
                reserve1: "1000000000000000000".to_string(),
                block_timestamp_last: 1,
            },
            total_supply: 1.0,
            total_supply_raw: "1000000000000000000".to_string(),
            block_number: 1,
        }
    }

    #[test]
    fn test_new_store_is_idle() {
        let store = PairDataStore::new();
        assert_eq!(store.state(), FetchState::Idle);
    }

    #[test]
    fn test_begin_discards_previous_record() {
        let store = PairDataStore::new();
        assert!(store.begin("0xaa").settle(Ok(record("0xaa"))));
        assert!(store.state().record().is_some());

        let _ticket = store.begin("0xbb");

        let state = store.state();
        assert!(state.is_loading());
        assert!(state.record().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_error_is_prefixed() {
        let store = PairDataStore::new();
        store.begin("0xaa").settle(Err(PairError::EmptyAddress));

        assert_eq!(
            store.state().error(),
            Some("Failed to fetch pair data: pair address is empty")
        );
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let store = PairDataStore::new();
        let older = store.begin("0xaa");
        let newer = store.begin("0xbb");

        assert!(newer.settle(Ok(record("0xbb"))));
        assert!(!older.settle(Ok(record("0xaa"))));

        assert_eq!(store.state().record().unwrap().pair_address, "0xbb");
    }

    #[test]
    fn test_stale_failure_does_not_clobber_loading() {
        let store = PairDataStore::new();
        let older = store.begin("0xaa");
        let _newer = store.begin("0xbb");

        assert!(!older.settle(Err(PairError::EmptyAddress)));
        assert!(store.state().is_loading());
    }

    #[test]
    fn test_dropped_ticket_clears_loading() {
        let store = PairDataStore::new();
        drop(store.begin("0xaa"));
        assert_eq!(store.state(), FetchState::Idle);
    }

    #[test]
    fn test_dropped_stale_ticket_keeps_newer_loading() {
        let store = PairDataStore::new();
        let older = store.begin("0xaa");
        let _newer = store.begin("0xbb");

        drop(older);

        assert_eq!(
            store.state(),
            FetchState::Loading {
                pair_address: "0xbb".to_string()
            }
        );
    }

    #[test]
    fn test_fetch_ignores_blank_input() {
        let store = PairDataStore::new();
        store.begin("0xaa").settle(Ok(record("0xaa")));
        let resolver = PairResolver::new(Offline);

        let state = tokio_test::block_on(store.fetch(&resolver, "  "));

        assert_eq!(state.record().unwrap().pair_address, "0xaa");
    }

    #[test]
    fn test_fetch_failure_clears_loading() {
        let store = PairDataStore::new();
        let resolver = PairResolver::new(Offline);

        let state = tokio_test::block_on(
            store.fetch(&resolver, "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc"),
        );

        assert!(!state.is_loading());
        assert_eq!(
            state.error(),
            Some("Failed to fetch pair data: multicall returned an unusable response: offline")
        );
    }
}
