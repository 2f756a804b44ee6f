use crate::error::{QuoteError, RangeError};
use crate::math::tick_math::{MAX_SQRT_PRICE, MIN_SQRT_PRICE, is_tick_index_in_bounds};
use crate::{Address, TICK_ARRAY_SIZE};

/// Decoded state of a concentrated liquidity pool, as read from chain.
///
/// The simulator treats this as read-only and works on a local copy of
/// the price, liquidity and current tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whirlpool {
    /// Q64.64
    pub sqrt_price: u128,
    pub liquidity: u128,
    pub tick_current_index: i32,
    pub tick_spacing: u16,
    /// hundredths of a basis point, `fee_rate / 1_000_000` per swap
    pub fee_rate: u16,
    /// basis points of the swap fee
    pub protocol_fee_rate: u16,
    pub token_mint_a: Address,
    pub token_mint_b: Address,
}

impl Whirlpool {
    pub fn new(
        token_mint_a: Address,
        token_mint_b: Address,
        tick_spacing: u16,
        fee_rate: u16,
    ) -> Self {
        Self {
            sqrt_price: 1 << 64,
            liquidity: 0,
            tick_current_index: 0,
            tick_spacing,
            fee_rate,
            protocol_fee_rate: 0,
            token_mint_a,
            token_mint_b,
        }
    }

    /// Number of ticks covered by one tick array of this pool.
    #[inline]
    pub fn ticks_in_array(&self) -> i32 {
        i32::from(self.tick_spacing) * TICK_ARRAY_SIZE as i32
    }

    /// Rejects snapshots the swap math cannot run on.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.tick_spacing == 0 {
            return Err(QuoteError::InvalidInput("tick spacing is zero".to_string()));
        }
        if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&self.sqrt_price) {
            return Err(RangeError::SqrtPrice(self.sqrt_price).into());
        }
        if !is_tick_index_in_bounds(self.tick_current_index) {
            return Err(RangeError::TickIndex(self.tick_current_index).into());
        }
        Ok(())
    }

    /// `true` for A to B when `input_mint` is token A, `false` for token B.
    pub fn a_to_b_for_input(&self, input_mint: &Address) -> Result<bool, QuoteError> {
        if *input_mint == self.token_mint_a {
            Ok(true)
        } else if *input_mint == self.token_mint_b {
            Ok(false)
        } else {
            Err(QuoteError::InvalidInput(format!(
                "mint {input_mint} is not part of the pool"
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    pub initialized: bool,
    /// liquidity added when the price crosses this tick upward
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
}

impl Tick {
    /// An initialized tick carrying `liquidity_net`.
    pub fn with_liquidity_net(liquidity_net: i128) -> Self {
        Self {
            initialized: true,
            liquidity_net,
            liquidity_gross: liquidity_net.unsigned_abs(),
            ..Self::default()
        }
    }
}

/// A page of `TICK_ARRAY_SIZE` consecutive initializable ticks starting at
/// `start_tick_index`, a multiple of `tick_spacing * TICK_ARRAY_SIZE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickArray {
    pub start_tick_index: i32,
    pub ticks: [Tick; TICK_ARRAY_SIZE],
}

impl TickArray {
    /// A page with every tick uninitialized.
    pub fn new(start_tick_index: i32) -> Self {
        Self {
            start_tick_index,
            ticks: [Tick::default(); TICK_ARRAY_SIZE],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::MAX_TICK_INDEX;

    fn mint(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn new_pool_is_valid() {
        let pool = Whirlpool::new(mint(1), mint(2), 64, 3000);
        assert!(pool.validate().is_ok());
        assert_eq!(pool.ticks_in_array(), 5632);
    }

    #[test]
    fn validate_rejects_zero_tick_spacing() {
        let pool = Whirlpool::new(mint(1), mint(2), 0, 3000);
        assert!(matches!(pool.validate(), Err(QuoteError::InvalidInput(_))));
    }

    #[test]
    fn validate_rejects_out_of_range_state() {
        let mut pool = Whirlpool::new(mint(1), mint(2), 1, 3000);
        pool.sqrt_price = MIN_SQRT_PRICE - 1;
        assert!(matches!(
            pool.validate(),
            Err(QuoteError::OutOfRange(RangeError::SqrtPrice(_)))
        ));

        let mut pool = Whirlpool::new(mint(1), mint(2), 1, 3000);
        pool.tick_current_index = MAX_TICK_INDEX + 1;
        assert!(matches!(
            pool.validate(),
            Err(QuoteError::OutOfRange(RangeError::TickIndex(_)))
        ));
    }

    #[test]
    fn direction_from_input_mint() {
        let pool = Whirlpool::new(mint(1), mint(2), 64, 3000);
        assert!(pool.a_to_b_for_input(&mint(1)).unwrap());
        assert!(!pool.a_to_b_for_input(&mint(2)).unwrap());
        assert!(matches!(
            pool.a_to_b_for_input(&mint(3)),
            Err(QuoteError::InvalidInput(_))
        ));
    }

    #[test]
    fn initialized_tick_tracks_gross_liquidity() {
        let tick = Tick::with_liquidity_net(-500);
        assert!(tick.initialized);
        assert_eq!(tick.liquidity_gross, 500);
        assert!(!TickArray::new(0).ticks.iter().any(|tick| tick.initialized));
    }
}
