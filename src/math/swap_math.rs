use crate::error::{MathError, QuoteError};
use crate::math::math_helpers::{mul_div, mul_div_rounding_up, u256_to_u64};
use crate::math::sqrt_price_math::{
    AmountDelta, get_amount_delta_a, get_amount_delta_b, get_next_sqrt_price,
    try_get_amount_delta_a, try_get_amount_delta_b,
};
use crate::{FEE_RATE_DENOMINATOR, U256_FEE_RATE_DENOMINATOR};
use alloy_primitives::U256;

/// The outcome of swapping within a single constant-liquidity segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    pub next_sqrt_price: u128,
    pub has_reached_target: bool,
}

/// Amount left to trade on an exact-input swap once the fee is taken:
/// `amount * (1_000_000 - fee_rate) / 1_000_000`.
pub fn apply_swap_fee(amount: u64, fee_rate: u16) -> Result<u64, MathError> {
    let remaining = U256::from(FEE_RATE_DENOMINATOR - u32::from(fee_rate));
    u256_to_u64(mul_div(U256::from(amount), remaining, U256_FEE_RATE_DENOMINATOR)?)
}

/// Fee charged on top of `amount_in`, rounded up:
/// `ceil(amount_in * fee_rate / (1_000_000 - fee_rate))`.
pub fn fee_on_amount_in(amount_in: u64, fee_rate: u16) -> Result<u64, MathError> {
    let remaining = U256::from(FEE_RATE_DENOMINATOR - u32::from(fee_rate));
    u256_to_u64(mul_div_rounding_up(
        U256::from(amount_in),
        U256::from(fee_rate),
        remaining,
    )?)
}

/// Swaps `amount_remaining` from `sqrt_price_current` toward
/// `sqrt_price_target` at constant `liquidity`.
///
/// The fixed side (the one `amount_remaining` is denominated in) rounds
/// up when it is the input and down when it is the output. The other side
/// rounds the opposite way, so the trader never gains from rounding.
pub fn compute_swap_step(
    amount_remaining: u64,
    fee_rate: u16,
    liquidity: u128,
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<SwapStep, QuoteError> {
    let initial_fixed_delta = try_get_fixed_delta(
        sqrt_price_current,
        sqrt_price_target,
        liquidity,
        amount_specified_is_input,
        a_to_b,
    )?;

    let amount_calc = if amount_specified_is_input {
        apply_swap_fee(amount_remaining, fee_rate)?
    } else {
        amount_remaining
    };

    let next_sqrt_price = if initial_fixed_delta.lte(amount_calc) {
        sqrt_price_target
    } else {
        get_next_sqrt_price(
            sqrt_price_current,
            liquidity,
            amount_calc,
            amount_specified_is_input,
            a_to_b,
        )?
    };

    let has_reached_target = next_sqrt_price == sqrt_price_target;

    let amount_unfixed_delta = get_unfixed_delta(
        sqrt_price_current,
        next_sqrt_price,
        liquidity,
        amount_specified_is_input,
        a_to_b,
    )?;

    // a partial step only moves as far as the fixed amount allows
    let amount_fixed_delta = if has_reached_target {
        initial_fixed_delta
    } else {
        try_get_fixed_delta(
            sqrt_price_current,
            next_sqrt_price,
            liquidity,
            amount_specified_is_input,
            a_to_b,
        )?
    }
    .value()?;

    let (amount_in, mut amount_out) = if amount_specified_is_input {
        (amount_fixed_delta, amount_unfixed_delta)
    } else {
        (amount_unfixed_delta, amount_fixed_delta)
    };

    if !amount_specified_is_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if amount_specified_is_input && !has_reached_target {
        // the remainder of a partial exact-input step is all fee
        amount_remaining
            .checked_sub(amount_in)
            .ok_or(MathError::Underflow)?
    } else {
        fee_on_amount_in(amount_in, fee_rate)?
    };

    Ok(SwapStep {
        amount_in,
        amount_out,
        fee_amount,
        next_sqrt_price,
        has_reached_target,
    })
}

fn try_get_fixed_delta(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<AmountDelta, QuoteError> {
    if a_to_b == amount_specified_is_input {
        try_get_amount_delta_a(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    } else {
        try_get_amount_delta_b(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            amount_specified_is_input,
        )
    }
}

fn get_unfixed_delta(
    sqrt_price_current: u128,
    sqrt_price_target: u128,
    liquidity: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Result<u64, QuoteError> {
    if a_to_b == amount_specified_is_input {
        get_amount_delta_b(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            !amount_specified_is_input,
        )
    } else {
        get_amount_delta_a(
            sqrt_price_current,
            sqrt_price_target,
            liquidity,
            !amount_specified_is_input,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::tick_index_to_sqrt_price;
    use proptest::prelude::*;
    use rstest::rstest;

    const ONE_X64: u128 = 1 << 64;
    const LIQUIDITY: u128 = 1_000_000_000_000;

    fn sqrt_price(tick_index: i32) -> u128 {
        tick_index_to_sqrt_price(tick_index).unwrap()
    }

    // ------------------------- fee helpers -------------------------

    #[rstest]
    #[case(1_000_000, 3000, 997_000)]
    #[case(1_000_000, 0, 1_000_000)]
    #[case(999, 3000, 996)]
    #[case(u64::MAX, 10_000, 18262276632972456098)]
    fn fee_is_taken_before_trading(#[case] amount: u64, #[case] fee_rate: u16, #[case] expected: u64) {
        assert_eq!(apply_swap_fee(amount, fee_rate).unwrap(), expected);
    }

    #[rstest]
    #[case(997_000, 3000, 3000)]
    #[case(996, 3000, 3)]
    #[case(1, 1, 1)]
    #[case(0, 3000, 0)]
    #[case(1_000_000, 0, 0)]
    fn fee_on_input_rounds_up(#[case] amount_in: u64, #[case] fee_rate: u16, #[case] expected: u64) {
        assert_eq!(fee_on_amount_in(amount_in, fee_rate).unwrap(), expected);
    }

    // ------------------------- exact input -------------------------

    #[test]
    fn exact_input_a_to_b_partial() {
        let step = compute_swap_step(1_000_000, 3000, LIQUIDITY, ONE_X64, sqrt_price(-64), true, true)
            .unwrap();
        assert_eq!(
            step,
            SwapStep {
                amount_in: 997_000,
                amount_out: 996_999,
                fee_amount: 3000,
                next_sqrt_price: 18446725682324046339,
                has_reached_target: false,
            }
        );
    }

    #[test]
    fn exact_input_a_to_b_reaches_target() {
        let target = sqrt_price(-64);
        let step =
            compute_swap_step(1_000_000_000_000, 3000, LIQUIDITY, ONE_X64, target, true, true).unwrap();
        assert_eq!(
            step,
            SwapStep {
                amount_in: 3_204_964_964,
                amount_out: 3_194_725_978,
                fee_amount: 9_643_827,
                next_sqrt_price: target,
                has_reached_target: true,
            }
        );
    }

    #[test]
    fn exact_input_b_to_a_zero_fee() {
        let step = compute_swap_step(1_000_000, 0, LIQUIDITY, ONE_X64, sqrt_price(64), true, false)
            .unwrap();
        assert_eq!(step.amount_in, 1_000_000);
        assert_eq!(step.amount_out, 999_999);
        assert_eq!(step.fee_amount, 0);
        assert_eq!(step.next_sqrt_price, 18446762520453625325);
        assert!(!step.has_reached_target);
    }

    #[test]
    fn zero_liquidity_moves_to_target_for_free() {
        let target = sqrt_price(-64);
        let step = compute_swap_step(1_000_000, 3000, 0, ONE_X64, target, true, true).unwrap();
        assert_eq!(step.amount_in, 0);
        assert_eq!(step.amount_out, 0);
        assert_eq!(step.fee_amount, 0);
        assert_eq!(step.next_sqrt_price, target);
        assert!(step.has_reached_target);
    }

    // ------------------------- exact output -------------------------

    #[test]
    fn exact_output_b_to_a_partial() {
        let step = compute_swap_step(1_000_000, 3000, LIQUIDITY, ONE_X64, sqrt_price(64), false, false)
            .unwrap();
        assert_eq!(
            step,
            SwapStep {
                amount_in: 1_000_002,
                amount_out: 1_000_000,
                fee_amount: 3010,
                next_sqrt_price: 18446762520472072089,
                has_reached_target: false,
            }
        );
    }

    #[test]
    fn exact_output_b_to_a_reaches_target() {
        let target = sqrt_price(64);
        let step =
            compute_swap_step(1_000_000_000_000, 3000, LIQUIDITY, ONE_X64, target, false, false)
                .unwrap();
        assert_eq!(step.amount_in, 3_204_964_964);
        assert_eq!(step.amount_out, 3_194_725_978);
        assert_eq!(step.fee_amount, 9_643_827);
        assert!(step.has_reached_target);
    }

    #[test]
    fn exact_output_a_to_b_partial() {
        let step = compute_swap_step(500_000, 10_000, LIQUIDITY, ONE_X64, sqrt_price(-64), false, true)
            .unwrap();
        assert_eq!(step.amount_in, 500_001);
        assert_eq!(step.amount_out, 500_000);
        assert_eq!(step.fee_amount, 5051);
        assert_eq!(step.next_sqrt_price, 18446734850337514761);
    }

    #[test]
    fn exact_output_never_exceeds_remaining() {
        for amount in [1u64, 7, 1_000, 123_456_789] {
            let step = compute_swap_step(amount, 3000, LIQUIDITY, ONE_X64, sqrt_price(-64), false, true)
                .unwrap();
            assert!(step.amount_out <= amount);
        }
    }

    // ------------------------- fee conservation -------------------------

    proptest! {
        #[test]
        fn full_step_conserves_fee(
            liquidity in 1u128..1_000_000_000_000_000_000,
            tick_lower in -5_000i32..5_000,
            width in 1i32..2_000,
            fee_rate in 0u16..50_000,
            a_to_b in any::<bool>(),
        ) {
            let lower = sqrt_price(tick_lower);
            let upper = sqrt_price(tick_lower + width);
            let (current, target) = if a_to_b { (upper, lower) } else { (lower, upper) };

            let step = compute_swap_step(u64::MAX, fee_rate, liquidity, current, target, true, a_to_b)
                .unwrap();
            prop_assert!(step.has_reached_target);

            let fixed_delta = if a_to_b {
                get_amount_delta_a(current, target, liquidity, true).unwrap()
            } else {
                get_amount_delta_b(current, target, liquidity, true).unwrap()
            };
            let expected_fee = fee_on_amount_in(fixed_delta, fee_rate).unwrap();
            prop_assert_eq!(step.amount_in, fixed_delta);
            prop_assert_eq!(step.amount_in + step.fee_amount, fixed_delta + expected_fee);
        }

        #[test]
        fn partial_exact_input_consumes_everything(
            amount in 1u64..1_000_000_000,
            fee_rate in 0u16..50_000,
        ) {
            let liquidity = 1_000_000_000_000_000_000u128;
            let step = compute_swap_step(amount, fee_rate, liquidity, ONE_X64, sqrt_price(-4_000), true, true)
                .unwrap();
            prop_assert!(!step.has_reached_target);
            prop_assert_eq!(step.amount_in + step.fee_amount, amount);
        }
    }
}
