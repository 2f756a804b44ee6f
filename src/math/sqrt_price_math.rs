use crate::Q64_RESOLUTION;
use crate::error::{MathError, QuoteError, RangeError};
use crate::math::math_helpers::{
    div_rounding_up, mul_div, mul_div_rounding_up, mul_shift_right, u256_to_u128, unlikely,
};
use crate::math::tick_math::{MAX_SQRT_PRICE, MIN_SQRT_PRICE};
use alloy_primitives::U256;

/// A token amount between two prices, which may not fit the u64 a swap
/// instruction can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountDelta {
    Valid(u64),
    ExceedsMax,
}

impl AmountDelta {
    /// `ExceedsMax` compares greater than every u64.
    #[inline]
    pub fn lte(self, other: u64) -> bool {
        match self {
            AmountDelta::Valid(value) => value <= other,
            AmountDelta::ExceedsMax => false,
        }
    }

    #[inline]
    pub fn exceeds_max(self) -> bool {
        matches!(self, AmountDelta::ExceedsMax)
    }

    #[inline]
    pub fn value(self) -> Result<u64, QuoteError> {
        match self {
            AmountDelta::Valid(value) => Ok(value),
            AmountDelta::ExceedsMax => Err(QuoteError::AmountExceedsMax),
        }
    }
}

impl From<U256> for AmountDelta {
    fn from(value: U256) -> Self {
        match u64::try_from(value) {
            Ok(value) => AmountDelta::Valid(value),
            Err(_) => AmountDelta::ExceedsMax,
        }
    }
}

#[inline(always)]
fn increasing_price_order(sqrt_price_0: u128, sqrt_price_1: u128) -> (u128, u128) {
    if sqrt_price_0 > sqrt_price_1 {
        (sqrt_price_1, sqrt_price_0)
    } else {
        (sqrt_price_0, sqrt_price_1)
    }
}

fn check_sqrt_price_bounds(sqrt_price: U256) -> Result<u128, QuoteError> {
    let sqrt_price = u256_to_u128(sqrt_price).map_err(|_| RangeError::SqrtPrice(u128::MAX))?;
    if unlikely(!(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price)) {
        return Err(RangeError::SqrtPrice(sqrt_price).into());
    }
    Ok(sqrt_price)
}

/// Token A between two sqrt prices:
/// `(L << 64) * (upper - lower) / (upper * lower)`.
///
/// The division is done in two steps, first by `upper` then by `lower`,
/// which rounds identically to dividing by the product.
pub fn try_get_amount_delta_a(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<AmountDelta, QuoteError> {
    let (sqrt_price_lower, sqrt_price_upper) = increasing_price_order(sqrt_price_0, sqrt_price_1);

    if unlikely(sqrt_price_lower == 0) {
        return Err(MathError::DivisionByZero.into());
    }

    let numerator = U256::from(liquidity) << Q64_RESOLUTION;
    let price_diff = U256::from(sqrt_price_upper - sqrt_price_lower);
    let upper = U256::from(sqrt_price_upper);
    let lower = U256::from(sqrt_price_lower);

    let quotient = if round_up {
        div_rounding_up(mul_div_rounding_up(numerator, price_diff, upper)?, lower)?
    } else {
        mul_div(numerator, price_diff, upper)? / lower
    };

    Ok(quotient.into())
}

/// Token B between two sqrt prices: `L * (upper - lower) >> 64`.
pub fn try_get_amount_delta_b(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<AmountDelta, QuoteError> {
    let (sqrt_price_lower, sqrt_price_upper) = increasing_price_order(sqrt_price_0, sqrt_price_1);
    let price_diff = sqrt_price_upper - sqrt_price_lower;

    Ok(mul_shift_right(liquidity, price_diff, Q64_RESOLUTION as usize, round_up)?.into())
}

pub fn get_amount_delta_a(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, QuoteError> {
    try_get_amount_delta_a(sqrt_price_0, sqrt_price_1, liquidity, round_up)?.value()
}

pub fn get_amount_delta_b(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> Result<u64, QuoteError> {
    try_get_amount_delta_b(sqrt_price_0, sqrt_price_1, liquidity, round_up)?.value()
}

/// Sqrt price after adding (`add`) or removing token A, rounded up:
/// `ceil((L << 64) * p / ((L << 64) ± p * amount))`.
///
/// Adding token A lowers the price, removing it raises the price.
pub fn get_next_sqrt_price_from_a_round_up(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128, QuoteError> {
    if amount == 0 {
        return Ok(sqrt_price);
    }

    let sqrt_price_u256 = U256::from(sqrt_price);
    let product = sqrt_price_u256 * U256::from(amount);
    let numerator = U256::from(liquidity) << Q64_RESOLUTION;

    let denominator = if add {
        numerator + product
    } else {
        if unlikely(numerator <= product) {
            return Err(MathError::Underflow.into());
        }
        numerator - product
    };

    check_sqrt_price_bounds(mul_div_rounding_up(numerator, sqrt_price_u256, denominator)?)
}

/// Sqrt price after adding (`add`) or removing token B, rounded down:
/// `p ± (amount << 64) / L`.
///
/// The quotient truncates when adding and rounds up when removing, so the
/// price always lands on the lower side.
pub fn get_next_sqrt_price_from_b_round_down(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    add: bool,
) -> Result<u128, QuoteError> {
    if unlikely(liquidity == 0) {
        return Err(MathError::DivisionByZero.into());
    }

    let amount_x64 = U256::from(amount) << Q64_RESOLUTION;
    let liquidity = U256::from(liquidity);
    let sqrt_price = U256::from(sqrt_price);

    let next = if add {
        sqrt_price + amount_x64 / liquidity
    } else {
        let delta = div_rounding_up(amount_x64, liquidity)?;
        sqrt_price
            .checked_sub(delta)
            .ok_or(MathError::Underflow)?
    };

    check_sqrt_price_bounds(next)
}

/// Sqrt price after trading `amount` of the fixed side of a swap.
///
/// The fixed side is token A when `a_to_b == amount_specified_is_input`,
/// either paid in (A to B, exact input) or taken out (B to A, exact output).
pub fn get_next_sqrt_price(
    sqrt_price: u128,
    liquidity: u128,
    amount: u64,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<u128, QuoteError> {
    if amount_specified_is_input == a_to_b {
        get_next_sqrt_price_from_a_round_up(
            sqrt_price,
            liquidity,
            amount,
            amount_specified_is_input,
        )
    } else {
        get_next_sqrt_price_from_b_round_down(
            sqrt_price,
            liquidity,
            amount,
            amount_specified_is_input,
        )
    }
}
