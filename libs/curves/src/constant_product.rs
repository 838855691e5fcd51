//! Constant product (x*y=k) math over integer reserves
//!
//! Exact integer arithmetic with 512-bit intermediates; amounts paid out of
//! the pool round down, amounts paid into it round up.

use ethers_core::types::U256;

use crate::error::CurveError;
use crate::fixed_point;

/// Basis points in 100%
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Constant product math functions
pub struct ConstantProductMath;

impl ConstantProductMath {
    /// Calculate tokens received for an ETH deposit
    ///
    /// # Arguments
    /// * `eth_reserve` - ETH held by the curve
    /// * `token_reserve` - Tokens held by the curve
    /// * `eth_amount` - ETH paid in
    ///
    /// # Returns
    /// `floor(eth_amount * token_reserve / (eth_reserve + eth_amount))`
    pub fn calculate_tokens_for_eth(
        eth_reserve: U256,
        token_reserve: U256,
        eth_amount: U256,
    ) -> Result<U256, CurveError> {
        Self::validate_reserves(eth_reserve, token_reserve)?;
        if eth_amount.is_zero() {
            return Err(CurveError::ZeroAmount);
        }

        let denominator = fixed_point::checked_add(eth_reserve, eth_amount)?;
        let tokens_out = fixed_point::mul_div_down(eth_amount, token_reserve, denominator)?;

        if tokens_out >= token_reserve {
            return Err(CurveError::ExceedsReserve {
                requested: tokens_out,
                available: token_reserve,
            });
        }

        Ok(tokens_out)
    }

    /// Calculate ETH received for selling tokens, net of a basis-point fee
    ///
    /// # Returns
    /// `(eth_out, fee)` where `eth_out + fee` is the gross curve output and the
    /// fee is rounded up
    pub fn calculate_eth_for_tokens(
        eth_reserve: U256,
        token_reserve: U256,
        token_amount: U256,
        fee_bps: u32,
    ) -> Result<(U256, U256), CurveError> {
        Self::validate_reserves(eth_reserve, token_reserve)?;
        if token_amount.is_zero() {
            return Err(CurveError::ZeroAmount);
        }
        if fee_bps > BPS_DENOMINATOR {
            return Err(CurveError::ValueTooLarge {
                value: U256::from(fee_bps),
            });
        }

        let denominator = fixed_point::checked_add(token_reserve, token_amount)?;
        let gross = fixed_point::mul_div_down(token_amount, eth_reserve, denominator)?;
        let fee = fixed_point::mul_div_up(gross, U256::from(fee_bps), U256::from(BPS_DENOMINATOR))?;

        Ok((gross - fee, fee))
    }

    /// Calculate the ETH required to buy exactly `token_amount` tokens
    ///
    /// `ceil(eth_reserve * token_amount / (token_reserve - token_amount))`
    pub fn calculate_eth_for_exact_tokens(
        eth_reserve: U256,
        token_reserve: U256,
        token_amount: U256,
    ) -> Result<U256, CurveError> {
        Self::validate_reserves(eth_reserve, token_reserve)?;
        if token_amount.is_zero() {
            return Err(CurveError::ZeroAmount);
        }
        if token_amount >= token_reserve {
            return Err(CurveError::ExceedsReserve {
                requested: token_amount,
                available: token_reserve,
            });
        }

        Ok(fixed_point::mul_div_up(eth_reserve, token_amount, token_reserve - token_amount)?)
    }

    /// ETH per token as a WAD value, rounded down
    pub fn current_price(eth_reserve: U256, token_reserve: U256) -> Result<U256, CurveError> {
        if token_reserve.is_zero() {
            return Err(CurveError::ZeroReserve);
        }
        Ok(fixed_point::div_wad_down(eth_reserve, token_reserve)?)
    }

    fn validate_reserves(eth_reserve: U256, token_reserve: U256) -> Result<(), CurveError> {
        if eth_reserve.is_zero() || token_reserve.is_zero() {
            return Err(CurveError::ZeroReserve);
        }
        Ok(())
    }
}
