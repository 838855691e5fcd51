//! Bancor continuous-token formula
//!
//! The reserve ratio is a `u32` on a `10^6` scale and only ever enters the
//! power as the exponent pair; balances and results stay in raw token units.
//! Powers are carried at `RAY` precision so small deposits keep their digits.

use ethers_core::types::U256;

use crate::error::CurveError;
use crate::fixed_point::{self, RAY};
use crate::power;

/// Reserve ratio scale; a ratio of `MAX_RATIO` is a linear curve
pub const MAX_RATIO: u32 = 1_000_000;

/// Bancor purchase/sale math over raw token amounts
pub struct BancorFormula;

impl BancorFormula {
    /// Calculate tokens minted for a reserve deposit
    ///
    /// # Arguments
    /// * `supply` - Current token supply
    /// * `reserve_balance` - Reserve tokens held by the curve
    /// * `reserve_ratio` - Reserve ratio on the `10^6` scale
    /// * `deposit_amount` - Reserve tokens paid in
    ///
    /// # Returns
    /// `supply * ((1 + deposit / reserve)^(ratio / 10^6) - 1)`, rounded down
    pub fn calculate_purchase_return(
        supply: U256,
        reserve_balance: U256,
        reserve_ratio: u32,
        deposit_amount: U256,
    ) -> Result<U256, CurveError> {
        Self::validate(reserve_balance, reserve_ratio)?;
        if deposit_amount.is_zero() {
            return Ok(U256::zero());
        }

        if reserve_ratio == MAX_RATIO {
            return Ok(fixed_point::mul_div_down(supply, deposit_amount, reserve_balance)?);
        }

        let base_n = fixed_point::checked_add(reserve_balance, deposit_amount)?;
        let growth = power::pow_down_scaled(
            base_n,
            reserve_balance,
            U256::from(reserve_ratio),
            U256::from(MAX_RATIO),
            RAY,
        )?;

        Ok(fixed_point::mul_div_down(supply, growth.saturating_sub(RAY), RAY)?)
    }

    /// Calculate reserve tokens returned for burning `sell_amount`
    ///
    /// `reserve * (1 - (1 - sell / supply)^(10^6 / ratio))`, rounded down.
    /// Burning the whole supply returns the whole reserve.
    pub fn calculate_sale_return(
        supply: U256,
        reserve_balance: U256,
        reserve_ratio: u32,
        sell_amount: U256,
    ) -> Result<U256, CurveError> {
        Self::validate(reserve_balance, reserve_ratio)?;
        if supply.is_zero() {
            return Err(CurveError::ZeroReserve);
        }
        if sell_amount > supply {
            return Err(CurveError::ExceedsReserve {
                requested: sell_amount,
                available: supply,
            });
        }
        if sell_amount.is_zero() {
            return Ok(U256::zero());
        }
        if sell_amount == supply {
            return Ok(reserve_balance);
        }

        if reserve_ratio == MAX_RATIO {
            return Ok(fixed_point::mul_div_down(reserve_balance, sell_amount, supply)?);
        }

        let remaining = power::pow_up_scaled(
            supply - sell_amount,
            supply,
            U256::from(MAX_RATIO),
            U256::from(reserve_ratio),
            RAY,
        )?;

        Ok(fixed_point::mul_div_down(reserve_balance, RAY.saturating_sub(remaining), RAY)?)
    }

    /// Calculate the reserve deposit needed to mint exactly `amount` tokens
    ///
    /// `reserve * ((1 + amount / supply)^(10^6 / ratio) - 1)`, rounded up
    pub fn calculate_fund_cost(
        supply: U256,
        reserve_balance: U256,
        reserve_ratio: u32,
        amount: U256,
    ) -> Result<U256, CurveError> {
        Self::validate(reserve_balance, reserve_ratio)?;
        if supply.is_zero() {
            return Err(CurveError::ZeroReserve);
        }
        if amount.is_zero() {
            return Ok(U256::zero());
        }

        if reserve_ratio == MAX_RATIO {
            return Ok(fixed_point::mul_div_up(reserve_balance, amount, supply)?);
        }

        let base_n = fixed_point::checked_add(supply, amount)?;
        let growth = power::pow_up_scaled(
            base_n,
            supply,
            U256::from(MAX_RATIO),
            U256::from(reserve_ratio),
            RAY,
        )?;
        let ratio = fixed_point::checked_sub(growth, RAY)?;

        Ok(fixed_point::mul_div_up(reserve_balance, ratio, RAY)?)
    }

    pub fn validate_reserve_ratio(reserve_ratio: u32) -> Result<(), CurveError> {
        if reserve_ratio == 0 || reserve_ratio > MAX_RATIO {
            return Err(CurveError::InvalidReserveRatio { ratio: reserve_ratio });
        }
        Ok(())
    }

    fn validate(reserve_balance: U256, reserve_ratio: u32) -> Result<(), CurveError> {
        if reserve_balance.is_zero() {
            return Err(CurveError::ZeroReserve);
        }
        Self::validate_reserve_ratio(reserve_ratio)
    }
}
