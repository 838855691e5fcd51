//! Strategy trait definitions for a unified bonding-curve interface

use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bancor_formula::BancorFormula;
use crate::constant_product::ConstantProductMath;
use crate::error::{CurveError, CurveErrorCode};
use crate::exponential_curve::ExponentialCurve;
use crate::fixed_point::{self, WAD};
use crate::weighted_math::WeightedMath;

/// Curve family identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    Weighted,
    Exponential,
    Bancor,
    ConstantProduct,
}

/// Pool state read by a quote; owned and updated by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolSnapshot {
    Weighted { balance_in: U256, balance_out: U256 },
    Exponential { spot_price: U256 },
    Bancor { supply: U256, reserve_balance: U256 },
    ConstantProduct { eth_reserve: U256, token_reserve: U256 },
}

impl PoolSnapshot {
    pub fn kind(&self) -> CurveKind {
        match self {
            PoolSnapshot::Weighted { .. } => CurveKind::Weighted,
            PoolSnapshot::Exponential { .. } => CurveKind::Exponential,
            PoolSnapshot::Bancor { .. } => CurveKind::Bancor,
            PoolSnapshot::ConstantProduct { .. } => CurveKind::ConstantProduct,
        }
    }
}

/// Priced trade plus the snapshot the pool should commit if it executes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Total the trader pays, fees included
    pub amount_in: U256,
    /// Total the trader receives, fees already taken out
    pub amount_out: U256,
    pub fee: U256,
    pub protocol_fee: U256,
    pub new_snapshot: PoolSnapshot,
}

impl Quote {
    fn feeless(amount_in: U256, amount_out: U256, new_snapshot: PoolSnapshot) -> Self {
        Self {
            amount_in,
            amount_out,
            fee: U256::zero(),
            protocol_fee: U256::zero(),
            new_snapshot,
        }
    }
}

/// Unified pricing interface over every curve family
pub trait BondingCurve {
    fn kind(&self) -> CurveKind;

    /// Price a trade where the trader fixes what they pay in
    ///
    /// For the exponential curve the amount is an item count being sold.
    fn quote_exact_in(
        &self,
        snapshot: &PoolSnapshot,
        amount_in: U256,
    ) -> Result<Quote, CurveError>;

    /// Price a trade where the trader fixes what they receive
    ///
    /// For the exponential curve the amount is an item count being bought.
    fn quote_exact_out(
        &self,
        snapshot: &PoolSnapshot,
        amount_out: U256,
    ) -> Result<Quote, CurveError>;
}

/// Curve parameters chosen at pool creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingStrategy {
    Weighted {
        weight_in: U256,
        weight_out: U256,
    },
    Exponential {
        delta: U256,
        fee_multiplier: U256,
        protocol_fee_multiplier: U256,
    },
    Bancor {
        reserve_ratio: u32,
    },
    ConstantProduct,
}

impl PricingStrategy {
    /// Check parameters once, before the strategy prices anything
    pub fn validate(&self) -> Result<(), CurveError> {
        match *self {
            PricingStrategy::Weighted {
                weight_in,
                weight_out,
            } => {
                if weight_in.is_zero() || weight_out.is_zero() {
                    return Err(CurveError::InvalidWeight);
                }
            }
            PricingStrategy::Exponential {
                delta,
                fee_multiplier,
                protocol_fee_multiplier,
            } => {
                if !ExponentialCurve::validate_delta(delta) {
                    return Err(CurveError::InvalidDelta);
                }
                let total_fee = fixed_point::checked_add(fee_multiplier, protocol_fee_multiplier)?;
                if total_fee > WAD {
                    return Err(CurveError::ValueTooLarge { value: total_fee });
                }
            }
            PricingStrategy::Bancor { reserve_ratio } => {
                BancorFormula::validate_reserve_ratio(reserve_ratio)?;
            }
            PricingStrategy::ConstantProduct => {}
        }
        Ok(())
    }

    fn mismatch(&self, snapshot: &PoolSnapshot) -> CurveError {
        CurveError::SnapshotMismatch {
            expected: self.kind(),
            found: snapshot.kind(),
        }
    }
}

impl BondingCurve for PricingStrategy {
    fn kind(&self) -> CurveKind {
        match self {
            PricingStrategy::Weighted { .. } => CurveKind::Weighted,
            PricingStrategy::Exponential { .. } => CurveKind::Exponential,
            PricingStrategy::Bancor { .. } => CurveKind::Bancor,
            PricingStrategy::ConstantProduct => CurveKind::ConstantProduct,
        }
    }

    fn quote_exact_in(
        &self,
        snapshot: &PoolSnapshot,
        amount_in: U256,
    ) -> Result<Quote, CurveError> {
        let quote = match (*self, *snapshot) {
            (
                PricingStrategy::Weighted {
                    weight_in,
                    weight_out,
                },
                PoolSnapshot::Weighted {
                    balance_in,
                    balance_out,
                },
            ) => {
                let amount_out = WeightedMath::compute_out_given_exact_in(
                    balance_in,
                    weight_in,
                    balance_out,
                    weight_out,
                    amount_in,
                )?;
                let new_snapshot = PoolSnapshot::Weighted {
                    balance_in: fixed_point::checked_add(balance_in, amount_in)?,
                    balance_out: balance_out - amount_out,
                };
                Quote::feeless(amount_in, amount_out, new_snapshot)
            }
            (
                PricingStrategy::Exponential {
                    delta,
                    fee_multiplier,
                    protocol_fee_multiplier,
                },
                PoolSnapshot::Exponential { spot_price },
            ) => {
                let num_items = item_count(amount_in)?;
                let info = ExponentialCurve::get_sell_info(
                    spot_price,
                    delta,
                    num_items,
                    fee_multiplier,
                    protocol_fee_multiplier,
                );
                check_code(info.error, num_items)?;
                Quote {
                    amount_in,
                    amount_out: info.output_value,
                    fee: info.fee,
                    protocol_fee: info.protocol_fee,
                    new_snapshot: PoolSnapshot::Exponential {
                        spot_price: info.new_spot_price,
                    },
                }
            }
            (
                PricingStrategy::Bancor { reserve_ratio },
                PoolSnapshot::Bancor {
                    supply,
                    reserve_balance,
                },
            ) => {
                let minted = BancorFormula::calculate_purchase_return(
                    supply,
                    reserve_balance,
                    reserve_ratio,
                    amount_in,
                )?;
                let new_snapshot = PoolSnapshot::Bancor {
                    supply: fixed_point::checked_add(supply, minted)?,
                    reserve_balance: fixed_point::checked_add(reserve_balance, amount_in)?,
                };
                Quote::feeless(amount_in, minted, new_snapshot)
            }
            (
                PricingStrategy::ConstantProduct,
                PoolSnapshot::ConstantProduct {
                    eth_reserve,
                    token_reserve,
                },
            ) => {
                let tokens_out = ConstantProductMath::calculate_tokens_for_eth(
                    eth_reserve,
                    token_reserve,
                    amount_in,
                )?;
                let new_snapshot = PoolSnapshot::ConstantProduct {
                    eth_reserve: fixed_point::checked_add(eth_reserve, amount_in)?,
                    token_reserve: token_reserve - tokens_out,
                };
                Quote::feeless(amount_in, tokens_out, new_snapshot)
            }
            _ => return Err(self.mismatch(snapshot)),
        };

        debug!(
            kind = ?self.kind(),
            amount_in = %quote.amount_in,
            amount_out = %quote.amount_out,
            "Quoted exact-in trade"
        );
        Ok(quote)
    }

    fn quote_exact_out(
        &self,
        snapshot: &PoolSnapshot,
        amount_out: U256,
    ) -> Result<Quote, CurveError> {
        let quote = match (*self, *snapshot) {
            (
                PricingStrategy::Weighted {
                    weight_in,
                    weight_out,
                },
                PoolSnapshot::Weighted {
                    balance_in,
                    balance_out,
                },
            ) => {
                let amount_in = WeightedMath::compute_in_given_exact_out(
                    balance_in,
                    weight_in,
                    balance_out,
                    weight_out,
                    amount_out,
                )?;
                let new_snapshot = PoolSnapshot::Weighted {
                    balance_in: fixed_point::checked_add(balance_in, amount_in)?,
                    balance_out: balance_out - amount_out,
                };
                Quote::feeless(amount_in, amount_out, new_snapshot)
            }
            (
                PricingStrategy::Exponential {
                    delta,
                    fee_multiplier,
                    protocol_fee_multiplier,
                },
                PoolSnapshot::Exponential { spot_price },
            ) => {
                let num_items = item_count(amount_out)?;
                let info = ExponentialCurve::get_buy_info(
                    spot_price,
                    delta,
                    num_items,
                    fee_multiplier,
                    protocol_fee_multiplier,
                );
                check_code(info.error, num_items)?;
                Quote {
                    amount_in: info.input_value,
                    amount_out,
                    fee: info.fee,
                    protocol_fee: info.protocol_fee,
                    new_snapshot: PoolSnapshot::Exponential {
                        spot_price: info.new_spot_price,
                    },
                }
            }
            (
                PricingStrategy::Bancor { reserve_ratio },
                PoolSnapshot::Bancor {
                    supply,
                    reserve_balance,
                },
            ) => {
                let cost = BancorFormula::calculate_fund_cost(
                    supply,
                    reserve_balance,
                    reserve_ratio,
                    amount_out,
                )?;
                let new_snapshot = PoolSnapshot::Bancor {
                    supply: fixed_point::checked_add(supply, amount_out)?,
                    reserve_balance: fixed_point::checked_add(reserve_balance, cost)?,
                };
                Quote::feeless(cost, amount_out, new_snapshot)
            }
            (
                PricingStrategy::ConstantProduct,
                PoolSnapshot::ConstantProduct {
                    eth_reserve,
                    token_reserve,
                },
            ) => {
                let cost = ConstantProductMath::calculate_eth_for_exact_tokens(
                    eth_reserve,
                    token_reserve,
                    amount_out,
                )?;
                let new_snapshot = PoolSnapshot::ConstantProduct {
                    eth_reserve: fixed_point::checked_add(eth_reserve, cost)?,
                    token_reserve: token_reserve - amount_out,
                };
                Quote::feeless(cost, amount_out, new_snapshot)
            }
            _ => return Err(self.mismatch(snapshot)),
        };

        debug!(
            kind = ?self.kind(),
            amount_in = %quote.amount_in,
            amount_out = %quote.amount_out,
            "Quoted exact-out trade"
        );
        Ok(quote)
    }
}

/// Item counts travel as `U256` through the trait but price as `u64`
fn item_count(amount: U256) -> Result<u64, CurveError> {
    if amount > U256::from(u64::MAX) {
        return Err(CurveError::ValueTooLarge { value: amount });
    }
    Ok(amount.as_u64())
}

fn check_code(code: CurveErrorCode, num_items: u64) -> Result<(), CurveError> {
    if code.is_ok() {
        return Ok(());
    }
    warn!(%code, num_items, "Exponential quote rejected");
    Err(CurveError::Rejected(code))
}
