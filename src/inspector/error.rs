use alloy_transport::TransportError;

/// Everything that can abort a pair resolution.
#[derive(Debug, thiserror::Error)]
pub enum PairError {
    #[error("pair address is empty")]
    EmptyAddress,

    #[error("cannot encode {function} call for target {target:?}: {reason}")]
    Encoding {
        function: &'static str,
        target: String,
        reason: String,
    },

    #[error("multicall request failed: {0}")]
    Aggregation(#[from] TransportError),

    #[error("multicall returned an unusable response: {0}")]
    AggregationResponse(String),

    #[error("call #{index} ({function}) reverted")]
    CallReverted { index: usize, function: &'static str },

    #[error("failed to decode {function} result of call #{index}: {reason}")]
    Decoding {
        index: usize,
        function: &'static str,
        reason: String,
    },
}

impl PairError {
    /// True for both flavours of aggregation failure (transport or malformed response)
    pub fn is_aggregation(&self) -> bool {
        matches!(self, Self::Aggregation(_) | Self::AggregationResponse(_))
    }
}
