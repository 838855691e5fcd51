//! Error types for fixed-point arithmetic and curve pricing
//!
//! Arithmetic failures (`MathError`) and domain failures (`CurveError`) are
//! kept apart so callers can tell a bad parameter combination from a value
//! that simply does not fit the fixed-point range. Exponential-curve quotes
//! report a `CurveErrorCode` inside their result instead of failing.

use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pool_traits::CurveKind;

/// Errors raised by the fixed-point primitive layer
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Final result exceeds `U256::MAX`
    #[error("Math error - overflow")]
    Overflow,

    /// Subtraction would go below zero
    #[error("Math error - underflow")]
    Underflow,

    #[error("Math error - division by zero")]
    DivisionByZero,

    /// Power base numerator or denominator is zero
    #[error("Math error - power base must be positive")]
    ZeroBase,

    /// Power exponent numerator or denominator is zero
    #[error("Math error - power exponent must be positive")]
    ZeroExponent,
}

/// Errors raised by the pricing curves
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error(transparent)]
    Math(#[from] MathError),

    /// A reserve or balance the formula divides by is zero
    #[error("Curve error - reserve is zero")]
    ZeroReserve,

    #[error("Curve error - trade amount is zero")]
    ZeroAmount,

    /// Trade is too small to yield a single output unit
    #[error("Curve error - trade yields zero output")]
    ZeroOutput,

    #[error("Curve error - weight must be positive")]
    InvalidWeight,

    #[error("Curve error - reserve ratio {ratio} outside (0, 1000000]")]
    InvalidReserveRatio { ratio: u32 },

    #[error("Curve error - requested {requested} but only {available} available")]
    ExceedsReserve { requested: U256, available: U256 },

    /// Exponential growth multiplier below one
    #[error("Curve error - delta must be at least 1.0")]
    InvalidDelta,

    /// Integer parameter does not fit its native width
    #[error("Curve error - value {value} too large")]
    ValueTooLarge { value: U256 },

    /// Exponential quote came back with a non-`Ok` code
    #[error("Curve error - quote rejected: {0}")]
    Rejected(CurveErrorCode),

    #[error("Curve error - strategy is {expected:?} but snapshot is {found:?}")]
    SnapshotMismatch { expected: CurveKind, found: CurveKind },
}

/// Result code carried by exponential-curve buy/sell info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurveErrorCode {
    #[default]
    Ok,
    /// Input or output value does not fit the fixed-point range
    InvalidNumItems,
    /// New spot price exceeds `u128::MAX`
    SpotPriceOverflow,
    /// `delta^n` does not fit the fixed-point range
    DeltaOverflow,
    /// Selling would drive the spot price to zero
    SpotPriceUnderflow,
    /// `delta` below `WAD`
    InvalidDelta,
}

impl CurveErrorCode {
    pub fn is_ok(self) -> bool {
        self == CurveErrorCode::Ok
    }
}

impl std::fmt::Display for CurveErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CurveErrorCode::Ok => "OK",
            CurveErrorCode::InvalidNumItems => "INVALID_NUMITEMS",
            CurveErrorCode::SpotPriceOverflow => "SPOT_PRICE_OVERFLOW",
            CurveErrorCode::DeltaOverflow => "DELTA_OVERFLOW",
            CurveErrorCode::SpotPriceUnderflow => "SPOT_PRICE_UNDERFLOW",
            CurveErrorCode::InvalidDelta => "INVALID_DELTA",
        };
        f.write_str(name)
    }
}
