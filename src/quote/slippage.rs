use std::fmt;

use alloy_primitives::U256;

use crate::error::QuoteError;
use crate::math::math_helpers::{mul_div, mul_div_rounding_up, u256_to_u64};
use crate::quote::FixedSide;

/// Fraction of the estimated counter-amount the trader accepts losing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlippageTolerance {
    numerator: u64,
    denominator: u64,
}

impl SlippageTolerance {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, QuoteError> {
        if denominator == 0 {
            return Err(QuoteError::InvalidInput(
                "slippage tolerance denominator is zero".to_string(),
            ));
        }
        Ok(Self { numerator, denominator })
    }

    /// `bps / 10_000`
    pub const fn from_bps(bps: u16) -> Self {
        Self { numerator: bps as u64, denominator: 10_000 }
    }

    pub const fn zero() -> Self {
        Self { numerator: 0, denominator: 1 }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    // den + num, in U256 so the sum cannot wrap
    fn widened(&self) -> U256 {
        U256::from(self.denominator) + U256::from(self.numerator)
    }
}

impl fmt::Display for SlippageTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // hundredths of a percent, truncated
        let hundredths =
            u128::from(self.numerator) * 10_000 / u128::from(self.denominator);
        write!(f, "{}.{:02}%", hundredths / 100, hundredths % 100)
    }
}

/// Minimum acceptable output of an exact-input swap:
/// `floor(amount_out * den / (den + num))`.
pub fn adjust_for_slippage(
    amount_out: u64,
    slippage_tolerance: SlippageTolerance,
) -> Result<u64, QuoteError> {
    let minimum = mul_div(
        U256::from(amount_out),
        U256::from(slippage_tolerance.denominator),
        slippage_tolerance.widened(),
    )?;
    Ok(u256_to_u64(minimum)?)
}

/// Maximum acceptable input of an exact-output swap:
/// `ceil(amount_in * (den + num) / den)`, saturating at `u64::MAX`.
pub fn adjust_for_slippage_input(
    amount_in: u64,
    slippage_tolerance: SlippageTolerance,
) -> Result<u64, QuoteError> {
    let maximum = mul_div_rounding_up(
        U256::from(amount_in),
        slippage_tolerance.widened(),
        U256::from(slippage_tolerance.denominator),
    )?;
    Ok(u256_to_u64(maximum).unwrap_or(u64::MAX))
}

/// The bound on the non-fixed side of a swap that the on-chain instruction
/// enforces.
pub fn other_amount_threshold(
    fixed_side: FixedSide,
    amount_in: u64,
    amount_out: u64,
    slippage_tolerance: SlippageTolerance,
) -> Result<u64, QuoteError> {
    match fixed_side {
        FixedSide::Input => adjust_for_slippage(amount_out, slippage_tolerance),
        FixedSide::Output => adjust_for_slippage_input(amount_in, slippage_tolerance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn zero_denominator_is_rejected() {
        assert!(matches!(
            SlippageTolerance::new(1, 0),
            Err(QuoteError::InvalidInput(_))
        ));
        assert!(SlippageTolerance::new(1, 100).is_ok());
    }

    #[rstest]
    #[case(SlippageTolerance::from_bps(100), "1.00%")]
    #[case(SlippageTolerance::from_bps(5), "0.05%")]
    #[case(SlippageTolerance::zero(), "0.00%")]
    #[case(SlippageTolerance::from_bps(10_000), "100.00%")]
    fn displays_as_percentage(#[case] tolerance: SlippageTolerance, #[case] expected: &str) {
        assert_eq!(tolerance.to_string(), expected);
    }

    #[rstest]
    #[case(1_000_000, 100, 990_099)]
    #[case(998_999, 100, 989_107)]
    #[case(1_000_000, 0, 1_000_000)]
    #[case(0, 100, 0)]
    #[case(u64::MAX, 0, u64::MAX)]
    fn minimum_output_rounds_down(#[case] amount: u64, #[case] bps: u16, #[case] expected: u64) {
        let tolerance = SlippageTolerance::from_bps(bps);
        assert_eq!(adjust_for_slippage(amount, tolerance).unwrap(), expected);
    }

    #[rstest]
    #[case(1_000_000, 100, 1_010_000)]
    #[case(3_018_081_326, 100, 3_048_262_140)]
    #[case(1, 1, 2)]
    #[case(1_000_000, 0, 1_000_000)]
    #[case(u64::MAX, 100, u64::MAX)]
    fn maximum_input_rounds_up(#[case] amount: u64, #[case] bps: u16, #[case] expected: u64) {
        let tolerance = SlippageTolerance::from_bps(bps);
        assert_eq!(adjust_for_slippage_input(amount, tolerance).unwrap(), expected);
    }

    #[test]
    fn threshold_follows_the_fixed_side() {
        let tolerance = SlippageTolerance::from_bps(100);
        assert_eq!(
            other_amount_threshold(FixedSide::Input, 1_000_000, 998_999, tolerance).unwrap(),
            989_107
        );
        assert_eq!(
            other_amount_threshold(FixedSide::Output, 1_000_000, 998_999, tolerance).unwrap(),
            1_010_000
        );
    }

    proptest! {
        #[test]
        fn thresholds_are_monotone_in_tolerance(
            amount in any::<u64>(),
            lower in 0u64..1_000_000,
            extra in 0u64..1_000_000,
            denominator in 1u64..1_000_000,
        ) {
            let tight = SlippageTolerance::new(lower, denominator).unwrap();
            let loose = SlippageTolerance::new(lower + extra, denominator).unwrap();

            let min_tight = adjust_for_slippage(amount, tight).unwrap();
            let min_loose = adjust_for_slippage(amount, loose).unwrap();
            prop_assert!(min_loose <= min_tight);
            prop_assert!(min_tight <= amount);

            let max_tight = adjust_for_slippage_input(amount, tight).unwrap();
            let max_loose = adjust_for_slippage_input(amount, loose).unwrap();
            prop_assert!(max_loose >= max_tight);
            prop_assert!(max_tight >= amount);
        }
    }
}
