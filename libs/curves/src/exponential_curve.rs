//! Discrete geometric item pricing
//!
//! Item `k` (1-based) bought from the current state costs
//! `spot_price * delta^k`; selling walks the price back down by `1/delta`
//! per item. Quotes report failures through [`CurveErrorCode`] so the caller
//! keeps its context and can branch on the category.

use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

use crate::error::{CurveErrorCode, MathError};
use crate::fixed_point::{self, WAD};

/// Lowest spot price a sell may leave behind (1 gwei)
pub const MIN_PRICE: U256 = U256([1_000_000_000, 0, 0, 0]);

/// Result of pricing a buy of `num_items`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuyInfo {
    pub error: CurveErrorCode,
    pub new_spot_price: U256,
    /// Total the trader pays, fees included
    pub input_value: U256,
    pub fee: U256,
    pub protocol_fee: U256,
}

/// Result of pricing a sell of `num_items`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SellInfo {
    pub error: CurveErrorCode,
    pub new_spot_price: U256,
    /// Total the trader receives, fees already taken out
    pub output_value: U256,
    pub fee: U256,
    pub protocol_fee: U256,
}

impl BuyInfo {
    fn rejected(error: CurveErrorCode) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }
}

impl SellInfo {
    fn rejected(error: CurveErrorCode) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }
}

/// Exponential bonding curve over discrete items
pub struct ExponentialCurve;

impl ExponentialCurve {
    /// `delta` is a per-item multiplier and may not shrink the price
    pub fn validate_delta(delta: U256) -> bool {
        delta >= WAD
    }

    /// Price a purchase of `num_items`
    ///
    /// # Arguments
    /// * `spot_price` - Price of the next item before the trade (WAD)
    /// * `delta` - Per-item growth multiplier, at least `WAD`
    /// * `num_items` - Number of items to buy
    /// * `fee_multiplier` - Pool fee as a WAD fraction of the input value
    /// * `protocol_fee_multiplier` - Protocol fee as a WAD fraction of the input value
    ///
    /// # Returns
    /// Buy info with `error == Ok` on success; every other field is zero when
    /// the error code is set.
    pub fn get_buy_info(
        spot_price: U256,
        delta: U256,
        num_items: u64,
        fee_multiplier: U256,
        protocol_fee_multiplier: U256,
    ) -> BuyInfo {
        if !Self::validate_delta(delta) {
            return BuyInfo::rejected(CurveErrorCode::InvalidDelta);
        }
        if num_items == 0 {
            return BuyInfo {
                new_spot_price: spot_price,
                ..BuyInfo::default()
            };
        }

        let delta_pow_n = match fixed_point::rpow(delta, num_items, WAD) {
            Ok(value) => value,
            Err(_) => return BuyInfo::rejected(CurveErrorCode::DeltaOverflow),
        };

        let new_spot_price = match fixed_point::mul_wad_up(spot_price, delta_pow_n) {
            Ok(price) if price <= U256::from(u128::MAX) => price,
            _ => return BuyInfo::rejected(CurveErrorCode::SpotPriceOverflow),
        };

        let priced = Self::buy_value(
            spot_price,
            delta,
            delta_pow_n,
            num_items,
            fee_multiplier,
            protocol_fee_multiplier,
        );
        match priced {
            Ok((input_value, fee, protocol_fee)) => BuyInfo {
                error: CurveErrorCode::Ok,
                new_spot_price,
                input_value,
                fee,
                protocol_fee,
            },
            Err(_) => BuyInfo::rejected(CurveErrorCode::InvalidNumItems),
        }
    }

    /// Price a sale of `num_items` back to the curve
    ///
    /// The first item sells at the current spot price, each further one at
    /// the price divided by `delta` once more.
    pub fn get_sell_info(
        spot_price: U256,
        delta: U256,
        num_items: u64,
        fee_multiplier: U256,
        protocol_fee_multiplier: U256,
    ) -> SellInfo {
        if !Self::validate_delta(delta) {
            return SellInfo::rejected(CurveErrorCode::InvalidDelta);
        }
        if num_items == 0 {
            return SellInfo {
                new_spot_price: spot_price,
                ..SellInfo::default()
            };
        }

        let priced =
            Self::sell_value(spot_price, delta, num_items, fee_multiplier, protocol_fee_multiplier);
        match priced {
            Ok(info) => info,
            Err(_) => SellInfo::rejected(CurveErrorCode::InvalidNumItems),
        }
    }

    /// Geometric series `buy_spot * (delta^n - 1) / (delta - 1)` plus fees
    fn buy_value(
        spot_price: U256,
        delta: U256,
        delta_pow_n: U256,
        num_items: u64,
        fee_multiplier: U256,
        protocol_fee_multiplier: U256,
    ) -> Result<(U256, U256, U256), MathError> {
        let buy_spot_price = fixed_point::mul_wad_up(spot_price, delta)?;

        let input_value = if delta == WAD {
            // Zero growth: flat pricing, the series denominator would be zero
            buy_spot_price
                .checked_mul(U256::from(num_items))
                .ok_or(MathError::Overflow)?
        } else {
            let numerator = fixed_point::checked_sub(delta_pow_n, WAD)?;
            let series = fixed_point::div_wad_up(numerator, delta - WAD)?;
            fixed_point::mul_wad_up(buy_spot_price, series)?
        };

        let protocol_fee = fixed_point::mul_wad_up(input_value, protocol_fee_multiplier)?;
        let fee = fixed_point::mul_wad_up(input_value, fee_multiplier)?;
        let total = fixed_point::checked_add(input_value, fee)?;
        let total = fixed_point::checked_add(total, protocol_fee)?;

        Ok((total, fee, protocol_fee))
    }

    fn sell_value(
        spot_price: U256,
        delta: U256,
        num_items: u64,
        fee_multiplier: U256,
        protocol_fee_multiplier: U256,
    ) -> Result<SellInfo, MathError> {
        let inv_delta = fixed_point::div_wad_down(WAD, delta)?;
        let inv_delta_pow_n = fixed_point::rpow(inv_delta, num_items, WAD)?;

        let new_spot_price = fixed_point::mul_wad_down(spot_price, inv_delta_pow_n)?;
        if new_spot_price < MIN_PRICE {
            return Ok(SellInfo::rejected(CurveErrorCode::SpotPriceUnderflow));
        }

        let output_value = if delta == WAD {
            spot_price
                .checked_mul(U256::from(num_items))
                .ok_or(MathError::Overflow)?
        } else {
            let numerator = fixed_point::checked_sub(WAD, inv_delta_pow_n)?;
            let series = fixed_point::div_wad_down(numerator, WAD - inv_delta)?;
            fixed_point::mul_wad_down(spot_price, series)?
        };

        let protocol_fee = fixed_point::mul_wad_up(output_value, protocol_fee_multiplier)?;
        let fee = fixed_point::mul_wad_up(output_value, fee_multiplier)?;
        let net = fixed_point::checked_sub(output_value, fee)?;
        let net = fixed_point::checked_sub(net, protocol_fee)?;

        Ok(SellInfo {
            error: CurveErrorCode::Ok,
            new_spot_price,
            output_value: net,
            fee,
            protocol_fee,
        })
    }
}
