//! WAD fixed-point arithmetic with explicit rounding direction
//!
//! Every value is an unsigned 256-bit integer scaled by `WAD = 10^18`.
//! Products are formed in 512 bits before dividing, so an intermediate
//! `a * b` never overflows; only a final result above `U256::MAX` does.
//!
//! Rounding is part of each function's contract: amounts a trader receives
//! use the `_down` variants, amounts a trader pays use the `_up` variants.

use ethers_core::types::{U256, U512};

use crate::error::MathError;

/// 1.0 in WAD fixed point
pub const WAD: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// 1.0 at 36 decimals, for intermediates that need more than WAD precision
pub const RAY: U256 = U256([0xb34b9f1000000000, 0xc097ce7bc90715, 0, 0]);

/// Newton steps are quadratic; 256-bit inputs settle in well under this
const SQRT_MAX_ITERATIONS: usize = 64;

/// Narrow a 512-bit intermediate back to 256 bits
#[inline]
fn narrow(value: U512) -> Result<U256, MathError> {
    let U512(limbs) = value;
    if limbs[4..].iter().any(|&limb| limb != 0) {
        return Err(MathError::Overflow);
    }
    Ok(U256([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// `floor(x * y / denominator)` with a 512-bit intermediate product
#[inline]
pub fn mul_div_down(x: U256, y: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    narrow(x.full_mul(y) / U512::from(denominator))
}

/// `ceil(x * y / denominator)` with a 512-bit intermediate product
#[inline]
pub fn mul_div_up(x: U256, y: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = x.full_mul(y).div_mod(U512::from(denominator));
    if remainder.is_zero() {
        narrow(quotient)
    } else {
        narrow(quotient + U512::one())
    }
}

/// `floor(a * b / WAD)`
#[inline]
pub fn mul_wad_down(a: U256, b: U256) -> Result<U256, MathError> {
    mul_div_down(a, b, WAD)
}

/// `ceil(a * b / WAD)`
#[inline]
pub fn mul_wad_up(a: U256, b: U256) -> Result<U256, MathError> {
    mul_div_up(a, b, WAD)
}

/// `floor(a * WAD / b)`, fails with `DivisionByZero` when `b = 0`
#[inline]
pub fn div_wad_down(a: U256, b: U256) -> Result<U256, MathError> {
    mul_div_down(a, WAD, b)
}

/// `ceil(a * WAD / b)`, fails with `DivisionByZero` when `b = 0`
#[inline]
pub fn div_wad_up(a: U256, b: U256) -> Result<U256, MathError> {
    mul_div_up(a, WAD, b)
}

/// Integer power by repeated squaring: `x^n` in fixed point with the given scale
///
/// Each squaring and each multiply-by-base is rescaled immediately with
/// `floor(x * y / scale)`. The loop runs once per bit of `n`, so at most 64
/// times. `0^0` is treated as 1 (returns `scale`), `0^n` for `n > 0` is 0.
pub fn rpow(x: U256, n: u64, scale: U256) -> Result<U256, MathError> {
    if n == 0 {
        return Ok(scale);
    }
    if x.is_zero() {
        return Ok(U256::zero());
    }

    let mut result = scale;
    let mut base = x;
    let mut remaining = n;
    loop {
        if remaining & 1 == 1 {
            result = mul_div_down(result, base, scale)?;
        }
        remaining >>= 1;
        if remaining == 0 {
            break;
        }
        // Squaring past the last consumed bit could overflow for nothing
        base = mul_div_down(base, base, scale)?;
    }

    Ok(result)
}

/// Floor integer square root (of the raw integer, not WAD-adjusted)
///
/// Newton's method from a power-of-two guess above the root, which makes the
/// sequence strictly decreasing until it settles.
pub fn sqrt(x: U256) -> U256 {
    if x.is_zero() {
        return U256::zero();
    }

    let mut guess = U256::one() << ((x.bits() + 1) / 2);
    for _ in 0..SQRT_MAX_ITERATIONS {
        let next = (guess + x / guess) >> 1;
        if next >= guess {
            return guess;
        }
        guess = next;
    }
    guess
}

/// `x / y`, or 0 when `y = 0`
#[inline]
pub fn div_or_zero(x: U256, y: U256) -> U256 {
    if y.is_zero() {
        U256::zero()
    } else {
        x / y
    }
}

/// `ceil(x / y)`, or 0 when `y = 0`
#[inline]
pub fn div_up_or_zero(x: U256, y: U256) -> U256 {
    if y.is_zero() {
        return U256::zero();
    }
    let (quotient, remainder) = x.div_mod(y);
    if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::one()
    }
}

/// `x % y`, or 0 when `y = 0`
#[inline]
pub fn mod_or_zero(x: U256, y: U256) -> U256 {
    if y.is_zero() {
        U256::zero()
    } else {
        x % y
    }
}

/// `WAD - x`, floored at zero
#[inline]
pub fn complement(x: U256) -> U256 {
    if x < WAD {
        WAD - x
    } else {
        U256::zero()
    }
}

#[inline]
pub fn checked_add(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// `a - b`, an `Underflow` error instead of wrapping
#[inline]
pub fn checked_sub(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}
