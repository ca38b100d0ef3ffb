//! Compile-time ABI definitions for on-chain contracts via Alloy `sol!`.

use alloy::sol;

// ---------------------------------------------------------------------------
// Aave V3 Pool
// ---------------------------------------------------------------------------

sol! {
    /// Aave V3 Pool contract, the core lending entry point.
    #[sol(rpc)]
    interface IPool {
        /// Get aggregated user position data.
        function getUserAccountData(address user) external view returns (
            uint256 totalCollateralBase,
            uint256 totalDebtBase,
            uint256 availableBorrowsBase,
            uint256 currentLiquidationThreshold,
            uint256 ltv,
            uint256 healthFactor
        );

        /// Supply (deposit) asset as collateral.
        function supply(
            address asset,
            uint256 amount,
            address onBehalfOf,
            uint16 referralCode
        ) external;

        /// Toggle whether a supplied reserve counts as the caller's collateral.
        function setUserUseReserveAsCollateral(address asset, bool useAsCollateral) external;
    }
}

// ---------------------------------------------------------------------------
// Aave V3 Pool Data Provider
// ---------------------------------------------------------------------------

sol! {
    /// Aave V3 PoolDataProvider: read-only reserve data.
    #[sol(rpc)]
    interface IPoolDataProvider {
        /// Get reserve configuration parameters.
        function getReserveConfigurationData(address asset) external view returns (
            uint256 decimals,
            uint256 ltv,
            uint256 liquidationThreshold,
            uint256 liquidationBonus,
            uint256 reserveFactor,
            bool usageAsCollateralEnabled,
            bool borrowingEnabled,
            bool stableBorrowRateEnabled,
            bool isActive,
            bool isFrozen
        );
    }
}

// ---------------------------------------------------------------------------
// ERC-20
// ---------------------------------------------------------------------------

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

// ---------------------------------------------------------------------------
// Wrapped native (WBNB / WETH9)
// ---------------------------------------------------------------------------

sol! {
    /// WETH9-style wrapper: `deposit()` mints 1:1 for the attached value.
    #[sol(rpc)]
    interface IWrappedNative {
        function deposit() external payable;
    }
}
