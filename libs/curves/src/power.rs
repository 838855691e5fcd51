//! Fractional-exponent power in pure integer arithmetic
//!
//! Computes `(base_n / base_d) ^ (exp_n / exp_d)` as a WAD value using only
//! 256-bit integer operations, so every caller on every platform gets the
//! same bits back.
//!
//! ## Method
//!
//! Binary fixed point with 96 fractional bits (`ONE = 2^96`):
//!
//! 1. Bases below one are inverted and the reciprocal taken at the end.
//! 2. `log2(base)`: the integer part comes from the bit length of the
//!    quotient, the fractional part from 96 successive squarings of the
//!    normalized mantissa (a square that reaches 2 contributes one bit).
//! 3. The logarithm is scaled by `exp_n / exp_d` with a 512-bit intermediate.
//! 4. `exp2`: the integer part becomes a shift, each set fractional bit `i`
//!    multiplies in the precomputed constant `2^(2^-i)`.
//!
//! Both loops run exactly 96 times regardless of the inputs.
//!
//! ## Accuracy
//!
//! Before the result is floored to the output scale the relative error stays
//! near `1e-27` per unit of exponent, so the only visible error is the final
//! quantum. Curves that subtract one from a power ask for the result at
//! [`RAY`] precision through [`pow_up_scaled`] / [`pow_down_scaled`], which
//! keeps `x^r - 1` accurate for trades down to `1e-12` of a reserve. Results of
//! only a few units, or bases within `2^-96` of one paired with very large
//! exponents, are quantum-limited: the absolute error is at most one unit plus
//! the directed margin, but the relative error is not bounded.
//!
//! [`pow_up`] and [`pow_down`] widen approximated results by a margin that
//! covers the approximation error, so a caller can round in the pool's favor.

use ethers_core::types::U256;

use crate::error::MathError;
use crate::fixed_point::{self, RAY, WAD};

const FRACTION_BITS: usize = 96;

/// 1.0 with 96 fractional bits
const ONE: U256 = U256([0, 1 << 32, 0, 0]);

/// 2.0 with 96 fractional bits
const TWO: U256 = U256([0, 1 << 33, 0, 0]);

const FRACTION_MASK: U256 = U256([u64::MAX, (1 << 32) - 1, 0, 0]);

/// Largest integer part of `log2(result)` that can still fit 256 bits
const MAX_WHOLE_BITS: u64 = 255;

/// Fixed part of the directed margin, in units of 1e-27 relative
pub const FIXED_POW_ERROR: u64 = 100;

/// Margin added per unit of exponent ratio, in units of 1e-27 relative
pub const EXPONENT_POW_ERROR: u64 = 1;

/// Relative error unit of the directed margin, 1e27
const ERROR_UNIT: U256 = U256([0x9fd0803ce8000000, 0x33b2e3c, 0, 0]);

/// `round(2^(2^-i) * 2^96)` for `i = 1..=96`
const EXP2_TABLE: [u128; FRACTION_BITS] = [
    0x16a09e667f3bcc908b2fb1367,
    0x1306fe0a31b7152de8d5a4630,
    0x1172b83c7d517adcdf7c8c50f,
    0x10b5586cf9890f6298b92b718,
    0x1059b0d31585743ae7c548eb7,
    0x102c9a3e778060ee6f7caca4f,
    0x10163da9fb33356d84a66ae33,
    0x100b1afa5abcbed6129ab13ec,
    0x10058c86da1c09ea1ff19d295,
    0x1002c605e2e8cec506d21bfc9,
    0x100162f3904051fa128bca9c5,
    0x1000b175effdc76ba38e31672,
    0x100058ba01fb9f96d6cacd4b2,
    0x10002c5cc37da9491d0985c35,
    0x1000162e525ee054754457d5a,
    0x10000b17255775c040618bf4a,
    0x1000058b91b5bc9ae2eed81ea,
    0x100002c5c89d5ec6ca4d7c8ad,
    0x10000162e43f4f831060e02d8,
    0x100000b1721bcfc99d9f890ea,
    0x10000058b90cf1e6d97f9ca15,
    0x1000002c5c863b73f016468f7,
    0x100000162e430e5a18f6119e4,
    0x1000000b1721835514b86e6d9,
    0x100000058b90c0b48c6be5df8,
    0x10000002c5c8601cc6b9e9421,
    0x1000000162e42fff037df38aa,
    0x10000000b17217fba9c739aa6,
    0x1000000058b90bfcdee5acd3c,
    0x100000002c5c85fe31f35a6a3,
    0x10000000162e42ff0999ce354,
    0x100000000b17217f80f4ef5ab,
    0x10000000058b90bfbf8479bd6,
    0x1000000002c5c85fdf84bd62b,
    0x100000000162e42fefb2fed25,
    0x1000000000b17217f7d5a7717,
    0x100000000058b90bfbe9ddbac,
    0x10000000002c5c85fdf4b15de,
    0x1000000000162e42fefa494f1,
    0x10000000000b17217f7d20cf9,
    0x1000000000058b90bfbe8f71d,
    0x100000000002c5c85fdf477b6,
    0x10000000000162e42fefa3ae5,
    0x100000000000b17217f7d1d35,
    0x10000000000058b90bfbe8e8b,
    0x1000000000002c5c85fdf4742,
    0x100000000000162e42fefa3a0,
    0x1000000000000b17217f7d1d0,
    0x100000000000058b90bfbe8e8,
    0x10000000000002c5c85fdf474,
    0x1000000000000162e42fefa3a,
    0x10000000000000b17217f7d1d,
    0x1000000000000058b90bfbe8e,
    0x100000000000002c5c85fdf47,
    0x10000000000000162e42fefa4,
    0x100000000000000b17217f7d2,
    0x10000000000000058b90bfbe9,
    0x1000000000000002c5c85fdf4,
    0x100000000000000162e42fefa,
    0x1000000000000000b17217f7d,
    0x100000000000000058b90bfbf,
    0x10000000000000002c5c85fdf,
    0x1000000000000000162e42ff0,
    0x10000000000000000b17217f8,
    0x1000000000000000058b90bfc,
    0x100000000000000002c5c85fe,
    0x10000000000000000162e42ff,
    0x100000000000000000b17217f,
    0x10000000000000000058b90c0,
    0x1000000000000000002c5c860,
    0x100000000000000000162e430,
    0x1000000000000000000b17218,
    0x100000000000000000058b90c,
    0x10000000000000000002c5c86,
    0x1000000000000000000162e43,
    0x10000000000000000000b1721,
    0x1000000000000000000058b91,
    0x100000000000000000002c5c8,
    0x10000000000000000000162e4,
    0x100000000000000000000b172,
    0x10000000000000000000058b9,
    0x1000000000000000000002c5d,
    0x100000000000000000000162e,
    0x1000000000000000000000b17,
    0x100000000000000000000058c,
    0x10000000000000000000002c6,
    0x1000000000000000000000163,
    0x10000000000000000000000b1,
    0x1000000000000000000000059,
    0x100000000000000000000002c,
    0x1000000000000000000000016,
    0x100000000000000000000000b,
    0x1000000000000000000000006,
    0x1000000000000000000000003,
    0x1000000000000000000000001,
    0x1000000000000000000000001,
];

/// How a power call was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evaluation {
    /// Base ratio is exactly one
    Unit,
    /// Exponent ratio is exactly one, the result is the base itself
    Identity,
    Approximate(U256),
}

/// `(base_n / base_d) ^ (exp_n / exp_d)` as a WAD value
///
/// The result carries no rounding bias; use [`pow_up`] or [`pow_down`] when
/// the caller needs one.
pub fn power(base_n: U256, base_d: U256, exp_n: U256, exp_d: U256) -> Result<U256, MathError> {
    match evaluate(base_n, base_d, exp_n, exp_d, WAD)? {
        Evaluation::Unit => Ok(WAD),
        Evaluation::Identity => fixed_point::mul_div_down(base_n, WAD, base_d),
        Evaluation::Approximate(value) => Ok(value),
    }
}

/// [`power`] biased upward: never below the real-valued result inside the
/// supported envelope
pub fn pow_up(base_n: U256, base_d: U256, exp_n: U256, exp_d: U256) -> Result<U256, MathError> {
    pow_up_scaled(base_n, base_d, exp_n, exp_d, WAD)
}

/// [`power`] biased downward, floored at zero
pub fn pow_down(base_n: U256, base_d: U256, exp_n: U256, exp_d: U256) -> Result<U256, MathError> {
    pow_down_scaled(base_n, base_d, exp_n, exp_d, WAD)
}

/// [`pow_up`] with the result expressed at `scale` (at most [`RAY`])
pub fn pow_up_scaled(
    base_n: U256,
    base_d: U256,
    exp_n: U256,
    exp_d: U256,
    scale: U256,
) -> Result<U256, MathError> {
    match evaluate(base_n, base_d, exp_n, exp_d, scale)? {
        Evaluation::Unit => Ok(scale),
        Evaluation::Identity => fixed_point::mul_div_up(base_n, scale, base_d),
        Evaluation::Approximate(value) => {
            fixed_point::checked_add(value, margin(value, exp_n, exp_d)?)
        }
    }
}

/// [`pow_down`] with the result expressed at `scale` (at most [`RAY`])
pub fn pow_down_scaled(
    base_n: U256,
    base_d: U256,
    exp_n: U256,
    exp_d: U256,
    scale: U256,
) -> Result<U256, MathError> {
    match evaluate(base_n, base_d, exp_n, exp_d, scale)? {
        Evaluation::Unit => Ok(scale),
        Evaluation::Identity => fixed_point::mul_div_down(base_n, scale, base_d),
        Evaluation::Approximate(value) => {
            Ok(value.saturating_sub(margin(value, exp_n, exp_d)?))
        }
    }
}

/// `base ^ (exp_n / exp_d)` for a WAD-scaled base
pub fn pow_wad(base: U256, exp_n: U256, exp_d: U256) -> Result<U256, MathError> {
    power(base, WAD, exp_n, exp_d)
}

/// Approximation error bound plus one unit for the final floor
///
/// log2 loses about `2^-96` absolute, which the exponent ratio scales; exp2
/// adds a fixed relative error on top.
fn margin(value: U256, exp_n: U256, exp_d: U256) -> Result<U256, MathError> {
    let exponent = fixed_point::div_up_or_zero(exp_n, exp_d);
    let bound = exponent
        .saturating_mul(U256::from(EXPONENT_POW_ERROR))
        .saturating_add(U256::from(FIXED_POW_ERROR));
    fixed_point::checked_add(fixed_point::mul_div_up(value, bound, ERROR_UNIT)?, U256::one())
}

fn evaluate(
    base_n: U256,
    base_d: U256,
    exp_n: U256,
    exp_d: U256,
    scale: U256,
) -> Result<Evaluation, MathError> {
    if base_n.is_zero() || base_d.is_zero() {
        return Err(MathError::ZeroBase);
    }
    if exp_n.is_zero() || exp_d.is_zero() {
        return Err(MathError::ZeroExponent);
    }
    if scale > RAY {
        return Err(MathError::Overflow);
    }
    if base_n == base_d {
        return Ok(Evaluation::Unit);
    }
    if exp_n == exp_d {
        return Ok(Evaluation::Identity);
    }

    let invert = base_n < base_d;
    let (numerator, denominator) = if invert {
        (base_d, base_n)
    } else {
        (base_n, base_d)
    };

    let log = log2(numerator, denominator)?;
    let scaled = match fixed_point::mul_div_down(log, exp_n, exp_d) {
        Ok(scaled) => scaled,
        // The reciprocal of something too large to represent is zero
        Err(MathError::Overflow) if invert => return Ok(Evaluation::Approximate(U256::zero())),
        Err(err) => return Err(err),
    };

    let whole = scaled >> FRACTION_BITS;
    if whole > U256::from(MAX_WHOLE_BITS) {
        return if invert {
            Ok(Evaluation::Approximate(U256::zero()))
        } else {
            Err(MathError::Overflow)
        };
    }
    let whole = whole.low_u64() as usize;
    let factor = exp2_fraction(scaled & FRACTION_MASK);

    let value = if invert {
        // scale / 2^(whole + fraction), factor lies in [ONE, TWO)
        ((scale << FRACTION_BITS) / factor) >> whole
    } else {
        let mantissa = scale * factor;
        if whole >= FRACTION_BITS {
            let shift = whole - FRACTION_BITS;
            if mantissa.bits() + shift > 256 {
                return Err(MathError::Overflow);
            }
            mantissa << shift
        } else {
            mantissa >> (FRACTION_BITS - whole)
        }
    };

    Ok(Evaluation::Approximate(value))
}

/// `log2(numerator / denominator)` with 96 fractional bits, for ratios >= 1
fn log2(numerator: U256, denominator: U256) -> Result<U256, MathError> {
    let whole = (numerator / denominator).bits() - 1;

    // Mantissa normalized into [ONE, TWO) without forming the full ratio
    let mut x = if whole <= FRACTION_BITS {
        fixed_point::mul_div_down(numerator, ONE >> whole, denominator)?
    } else {
        numerator / (denominator << (whole - FRACTION_BITS))
    };
    let mut result = U256::from(whole) << FRACTION_BITS;

    for bit in (0..FRACTION_BITS).rev() {
        x = (x * x) >> FRACTION_BITS;
        if x >= TWO {
            x = x >> 1usize;
            result = result | (U256::one() << bit);
        }
    }

    Ok(result)
}

/// `2^fraction` for a 96-bit fraction, in `[ONE, TWO)`
fn exp2_fraction(fraction: U256) -> U256 {
    let mut result = ONE;
    for (i, factor) in EXP2_TABLE.iter().enumerate() {
        if fraction.bit(FRACTION_BITS - 1 - i) {
            result = (result * U256::from(*factor)) >> FRACTION_BITS;
        }
    }
    result
}
