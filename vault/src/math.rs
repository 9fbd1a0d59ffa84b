//! # Fixed-Point Primitives
//!
//! Everything the conversion engine needs boils down to one operation:
//! `a * b / c` with a chosen rounding direction. The product of two `u128`
//! amounts can need 256 bits, so it is taken in [`U256`] and only the
//! quotient is narrowed back, with an explicit overflow check.
//!
//! Rounding direction is decided here and nowhere else. Auditing the
//! favor-the-vault rule means auditing [`mul_div`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer for intermediate products.
    pub struct U256(4);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Arithmetic failures in the fixed-point primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// The result does not fit in a `u128`.
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Direction in which an inexact quotient is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rounding {
    /// Toward zero (floor for unsigned values).
    Down,
    /// Away from zero (ceiling for unsigned values).
    Up,
}

impl std::fmt::Display for Rounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rounding::Down => write!(f, "down"),
            Rounding::Up => write!(f, "up"),
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Computes `a * b / denominator` in 256-bit precision, rounded as asked.
///
/// # Errors
///
/// Returns [`MathError::DivisionByZero`] if `denominator` is zero and
/// [`MathError::Overflow`] if the rounded quotient exceeds `u128::MAX`.
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128, MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    if a == 0 || b == 0 {
        return Ok(0);
    }

    // Both factors are below 2^128, so the product is below 2^256.
    let product = U256::from(a) * U256::from(b);
    let denominator = U256::from(denominator);

    let mut quotient = product / denominator;
    if rounding == Rounding::Up && !(product % denominator).is_zero() {
        // quotient <= product / 2 whenever there is a remainder, so this
        // cannot leave 256 bits.
        quotient = quotient + U256::one();
    }

    narrow(quotient)
}

/// Checked `u128` addition.
pub fn checked_add(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

fn narrow(value: U256) -> Result<u128, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.low_u128())
}
