//! Contract interfaces consumed by the inspector.
//!
//! These are fixed, externally defined ABIs: the Uniswap V2 pair, the ERC-20
//! metadata extension and the Multicall2/Multicall3 `tryBlockAndAggregate`
//! entry point.

use alloy_sol_types::sol;

// ============================================
// MULTICALL INTERFACE
// ============================================

sol! {
    /// Shared by Multicall2 and Multicall3
    interface IMulticall {
        struct Call {
            address target;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function tryBlockAndAggregate(bool requireSuccess, Call[] calldata calls)
            external payable returns (uint256 blockNumber, bytes32 blockHash, Result[] memory returnData);
    }
}

// ============================================
// PAIR + TOKEN INTERFACES
// ============================================

sol! {
    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function totalSupply() external view returns (uint256);
    }

    interface IERC20Metadata {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}
