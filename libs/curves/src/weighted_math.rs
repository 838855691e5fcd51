//! Two-asset weighted invariant math (Balancer style)
//!
//! Prices a swap against `balance_in^weight_in * balance_out^weight_out = k`.
//! Weights are WAD values; only their ratio matters. With equal weights the
//! curve is the constant-product curve.
//!
//! The power is taken over the exact balance ratio and carried at `RAY`
//! precision, so small trades keep their digits and no intermediate rounds
//! in the trader's favor.

use ethers_core::types::U256;

use crate::error::CurveError;
use crate::fixed_point::{self, RAY};
use crate::power;

/// Weighted pool math with pool-favoring rounding
pub struct WeightedMath;

impl WeightedMath {
    /// Calculate tokens received for an exact input amount
    ///
    /// # Arguments
    /// * `balance_in` - Pool balance of the token being sold to the pool
    /// * `weight_in` - Weight of that token
    /// * `balance_out` - Pool balance of the token being bought
    /// * `weight_out` - Weight of that token
    /// * `amount_in` - Exact amount the trader pays in
    ///
    /// # Returns
    /// `balance_out * (1 - (balance_in / (balance_in + amount_in))^(weight_in / weight_out))`,
    /// rounded down and always strictly between zero and `balance_out`
    pub fn compute_out_given_exact_in(
        balance_in: U256,
        weight_in: U256,
        balance_out: U256,
        weight_out: U256,
        amount_in: U256,
    ) -> Result<U256, CurveError> {
        Self::validate(balance_in, weight_in, balance_out, weight_out)?;
        if amount_in.is_zero() {
            return Err(CurveError::ZeroAmount);
        }

        let denominator = fixed_point::checked_add(balance_in, amount_in)?;
        let remaining =
            power::pow_up_scaled(balance_in, denominator, weight_in, weight_out, RAY)?;
        let amount_out =
            fixed_point::mul_div_down(balance_out, RAY.saturating_sub(remaining), RAY)?;

        if amount_out.is_zero() {
            return Err(CurveError::ZeroOutput);
        }
        if amount_out >= balance_out {
            return Err(CurveError::ExceedsReserve {
                requested: amount_out,
                available: balance_out,
            });
        }

        Ok(amount_out)
    }

    /// Calculate the input required for an exact output amount
    ///
    /// # Returns
    /// `balance_in * ((balance_out / (balance_out - amount_out))^(weight_out / weight_in) - 1)`,
    /// rounded up
    pub fn compute_in_given_exact_out(
        balance_in: U256,
        weight_in: U256,
        balance_out: U256,
        weight_out: U256,
        amount_out: U256,
    ) -> Result<U256, CurveError> {
        Self::validate(balance_in, weight_in, balance_out, weight_out)?;
        if amount_out.is_zero() {
            return Err(CurveError::ZeroAmount);
        }
        if amount_out >= balance_out {
            return Err(CurveError::ExceedsReserve {
                requested: amount_out,
                available: balance_out,
            });
        }

        let growth = power::pow_up_scaled(
            balance_out,
            balance_out - amount_out,
            weight_out,
            weight_in,
            RAY,
        )?;
        let ratio = fixed_point::checked_sub(growth, RAY)?;

        Ok(fixed_point::mul_div_up(balance_in, ratio, RAY)?)
    }

    /// Marginal price of the out token in units of the in token, rounded up
    pub fn spot_price(
        balance_in: U256,
        weight_in: U256,
        balance_out: U256,
        weight_out: U256,
    ) -> Result<U256, CurveError> {
        Self::validate(balance_in, weight_in, balance_out, weight_out)?;

        let numerator = fixed_point::div_wad_up(balance_in, weight_in)?;
        let denominator = fixed_point::div_wad_down(balance_out, weight_out)?;
        if denominator.is_zero() {
            return Err(CurveError::ZeroReserve);
        }

        Ok(fixed_point::div_wad_up(numerator, denominator)?)
    }

    fn validate(
        balance_in: U256,
        weight_in: U256,
        balance_out: U256,
        weight_out: U256,
    ) -> Result<(), CurveError> {
        if balance_in.is_zero() || balance_out.is_zero() {
            return Err(CurveError::ZeroReserve);
        }
        if weight_in.is_zero() || weight_out.is_zero() {
            return Err(CurveError::InvalidWeight);
        }
        Ok(())
    }
}
