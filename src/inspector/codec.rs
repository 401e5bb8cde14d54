//! Call encoding and result decoding on top of the `sol!` bindings.
//!
//! The schema is the `sol!` interface and the function is the generated call
//! type, so an unknown function or a mistyped argument does not compile. What
//! remains fallible at runtime is turning a user supplied target string into an
//! address, and decoding whatever bytes came back from the chain.

use super::{multicall::CallOutcome, PairError};

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use std::str::FromStr;

/// One entry of a multicall batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub target: Address,
    pub call_data: Bytes,
    /// Solidity signature, kept for error reporting
    pub function: &'static str,
}

pub fn encode_call<C: SolCall>(target: Address, call: &C) -> EncodedCall {
    EncodedCall {
        target,
        call_data: call.abi_encode().into(),
        function: C::SIGNATURE,
    }
}

/// Like [`encode_call`], for a target that is still a string
pub fn encode_call_at<C: SolCall>(target: &str, call: &C) -> Result<EncodedCall, PairError> {
    let address = Address::from_str(target.trim()).map_err(|e| PairError::Encoding {
        function: C::SIGNATURE,
        target: target.to_string(),
        reason: e.to_string(),
    })?;

    Ok(encode_call(address, call))
}

/// Decode the outcome of batch entry `index` as the return value of `C`.
///
/// A `false` success flag is reported as [`PairError::CallReverted`]; the
/// revert payload is never handed to the ABI decoder. Words that do not fit
/// the declared type (a `uint8` above 255, an address with dirty high bytes)
/// are rejected, not truncated.
pub fn decode_result<C: SolCall>(index: usize, outcome: &CallOutcome) -> Result<C::Return, PairError> {
    if !outcome.success {
        return Err(PairError::CallReverted {
            index,
            function: C::SIGNATURE,
        });
    }

    if outcome.return_data.is_empty() {
        return Err(PairError::Decoding {
            index,
            function: C::SIGNATURE,
            reason: "empty return data".to_string(),
        });
    }

    C::abi_decode_returns_validate(&outcome.return_data).map_err(|e| PairError::Decoding {
        index,
        function: C::SIGNATURE,
        reason: e.to_string(),
    })
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::abi::{IERC20Metadata, IMulticall, IUniswapV2Pair};
    use alloy_primitives::{address, U256};
    use alloy_sol_types::SolValue;

    fn ok(data: Vec<u8>) -> CallOutcome {
        CallOutcome {
            success: true,
            return_data: data.into(),
        }
    }

    #[test]
    fn test_encode_call_is_selector_only_for_getters() {
        let pair = address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc");
        let call = encode_call(pair, &IUniswapV2Pair::getReservesCall {});

        assert_eq!(call.target, pair);
        assert_eq!(&call.call_data[..], &[0x09u8, 0x02, 0xf1, 0xac]);
        assert_eq!(call.function, "getReserves()");
    }

    #[test]
    fn test_encode_call_at_parses_target() {
        let call = encode_call_at(
            "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc",
            &IUniswapV2Pair::token0Call {},
        )
        .unwrap();
        assert_eq!(call.target, address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc"));
        assert_eq!(&call.call_data[..], IUniswapV2Pair::token0Call::SELECTOR.as_slice());
    }

    #[test]
    fn test_encode_call_at_rejects_malformed_target() {
        let err = encode_call_at("0xnot-an-address", &IUniswapV2Pair::token0Call {}).unwrap_err();
        assert!(matches!(err, PairError::Encoding { function: "token0()", .. }));
    }

    #[test]
    fn test_call_data_round_trip() {
        let original = IMulticall::tryBlockAndAggregateCall {
            requireSuccess: false,
            calls: vec![
                IMulticall::Call {
                    target: address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc"),
                    callData: IUniswapV2Pair::getReservesCall {}.abi_encode().into(),
                },
                IMulticall::Call {
                    target: address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
                    callData: IERC20Metadata::symbolCall {}.abi_encode().into(),
                },
            ],
        };

        let encoded = original.abi_encode();
        let decoded = IMulticall::tryBlockAndAggregateCall::abi_decode(&encoded).unwrap();

        assert!(!decoded.requireSuccess);
        assert_eq!(decoded.calls.len(), 2);
        assert_eq!(decoded.calls[1].target, original.calls[1].target);
        assert_eq!(decoded.abi_encode(), encoded);
    }

    #[test]
    fn test_decode_address_and_string() {
        let token = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
        let decoded =
            decode_result::<IUniswapV2Pair::token1Call>(1, &ok(SolValue::abi_encode(&token))).unwrap();
        assert_eq!(decoded, token);

        let name = decode_result::<IERC20Metadata::nameCall>(
            0,
            &ok(SolValue::abi_encode(&"Wrapped Ether".to_string())),
        )
        .unwrap();
        assert_eq!(name, "Wrapped Ether");
    }

    #[test]
    fn test_decode_reserves_tuple() {
        let payload = SolValue::abi_encode(&(
            U256::from(1_000u64),
            U256::from(2_000u64),
            U256::from(1_690_000_000u64),
        ));
        let reserves = decode_result::<IUniswapV2Pair::getReservesCall>(2, &ok(payload)).unwrap();

        assert_eq!(U256::from(reserves.reserve0), U256::from(1_000u64));
        assert_eq!(U256::from(reserves.reserve1), U256::from(2_000u64));
        assert_eq!(reserves.blockTimestampLast, 1_690_000_000u32);
    }

    #[test]
    fn test_decode_empty_payload_fails() {
        let err = decode_result::<IUniswapV2Pair::getReservesCall>(2, &ok(Vec::new()))
            .err()
            .unwrap();
        assert!(matches!(err, PairError::Decoding { index: 2, .. }));
    }

    #[test]
    fn test_decode_truncated_payload_fails() {
        // one word where three are declared
        let err = decode_result::<IUniswapV2Pair::getReservesCall>(2, &ok(vec![0u8; 32]))
            .err()
            .unwrap();
        assert!(matches!(err, PairError::Decoding { function: "getReserves()", .. }));
    }

    #[test]
    fn test_decode_rejects_out_of_range_uint8() {
        let payload = SolValue::abi_encode(&U256::from(262u64));
        let err = decode_result::<IERC20Metadata::decimalsCall>(5, &ok(payload)).unwrap_err();
        assert!(matches!(
            err,
            PairError::Decoding {
                index: 5,
                function: "decimals()",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_rejects_address_with_dirty_high_bytes() {
        let err = decode_result::<IUniswapV2Pair::token0Call>(0, &ok(vec![0xffu8; 32])).unwrap_err();
        assert!(matches!(
            err,
            PairError::Decoding {
                index: 0,
                function: "token0()",
                ..
            }
        ));
    }

    #[test]
    fn test_decode_rejects_reserve_wider_than_uint112() {
        let payload = SolValue::abi_encode(&(U256::MAX, U256::from(1u64), U256::from(1u64)));
        let err = decode_result::<IUniswapV2Pair::getReservesCall>(2, &ok(payload))
            .err()
            .unwrap();
        assert!(matches!(err, PairError::Decoding { index: 2, .. }));
    }

    #[test]
    fn test_decode_failed_call_is_reported_as_revert() {
        let reverted = CallOutcome {
            success: false,
            return_data: Bytes::new(),
        };
        let err = decode_result::<IERC20Metadata::decimalsCall>(5, &reverted).unwrap_err();
        assert!(matches!(
            err,
            PairError::CallReverted {
                index: 5,
                function: "decimals()"
            }
        ));
    }
}
