//! Pair inspection pipeline
//!
//! Two Multicall round trips per pair: pair facts first, token metadata second.

pub mod abi;
mod codec;
mod error;
mod multicall;
mod resolver;
mod types;

pub use codec::EncodedCall;
pub use error::PairError;
pub use multicall::{Aggregator, BatchOutput, MulticallAggregator};
pub use resolver::PairResolver;
pub use types::{PairRecord, Reserves, TokenInfo, LP_TOKEN_DECIMALS};
