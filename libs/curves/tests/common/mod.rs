//! Shared helpers for curve integration tests
//!
//! The `f64` reference formulas go through `ln_1p`/`exp_m1` so they stay
//! accurate when a base sits very close to one.

#![allow(dead_code)]

use bonding_curves::{U256, WAD};

/// 0.01%
pub const TOLERANCE: f64 = 1e-4;

pub fn wad(units: u64) -> U256 {
    U256::from(units) * WAD
}

pub fn from_dec(s: &str) -> U256 {
    U256::from_dec_str(s).unwrap()
}

pub fn to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap()
}

pub fn relative_error(actual: U256, expected: f64) -> f64 {
    ((to_f64(actual) - expected) / expected).abs()
}

/// Output of a weighted pool for an exact input, in raw units
pub fn weighted_out(
    balance_in: f64,
    weight_in: f64,
    balance_out: f64,
    weight_out: f64,
    amount_in: f64,
) -> f64 {
    let log_base = -(amount_in / balance_in).ln_1p();
    -balance_out * ((weight_in / weight_out) * log_base).exp_m1()
}

/// Input a weighted pool requires for an exact output, in raw units
pub fn weighted_in(
    balance_in: f64,
    weight_in: f64,
    balance_out: f64,
    weight_out: f64,
    amount_out: f64,
) -> f64 {
    let log_base = -(-amount_out / balance_out).ln_1p();
    balance_in * ((weight_out / weight_in) * log_base).exp_m1()
}

/// Cost of buying `n` items from an exponential curve, fees excluded
pub fn geometric_buy(spot_price: f64, delta_minus_one: f64, num_items: f64) -> f64 {
    let growth = (num_items * delta_minus_one.ln_1p()).exp_m1();
    spot_price * (1.0 + delta_minus_one) * growth / delta_minus_one
}

/// Tokens minted by a Bancor purchase
pub fn bancor_purchase(supply: f64, reserve: f64, reserve_ratio: u32, deposit: f64) -> f64 {
    let exponent = reserve_ratio as f64 / 1_000_000.0;
    supply * (exponent * (deposit / reserve).ln_1p()).exp_m1()
}

/// Ratio of two raw `U256` amounts as `f64`
pub fn as_fraction(numerator: U256, denominator: U256) -> f64 {
    to_f64(numerator) / to_f64(denominator)
}

/// Install a test subscriber so traced code paths are exercised
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bonding_curves=debug")
        .with_test_writer()
        .try_init();
}
