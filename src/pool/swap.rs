use crate::error::{MathError, QuoteError};
use crate::math::liquidity_math::liquidity_after_crossing;
use crate::math::math_helpers::unlikely;
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{
    MAX_SQRT_PRICE, MIN_SQRT_PRICE, sqrt_price_to_tick_index, tick_index_to_sqrt_price,
};
use crate::pool::tick_array::{TickArraySequence, next_current_tick_index};
use crate::pool::whirlpool::Whirlpool;
use crate::{MAX_TICK_ARRAY_CROSSINGS, TICK_ARRAY_SIZE};
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Amount of the fixed side, input when `amount_specified_is_input`.
    pub amount: u64,
    pub amount_specified_is_input: bool,
    /// Swap direction: `true` sells token A for token B.
    pub a_to_b: bool,
    /// Price the swap may not move beyond. `None` uses the protocol bound
    /// in the swap direction.
    pub sqrt_price_limit: Option<u128>,
    /// Tick array pages the swap may move past, beyond the first one.
    pub max_tick_array_crossings: usize,
}

impl SwapParams {
    #[inline]
    pub fn new(amount: u64, amount_specified_is_input: bool, a_to_b: bool) -> Self {
        Self {
            amount,
            amount_specified_is_input,
            a_to_b,
            sqrt_price_limit: None,
            max_tick_array_crossings: MAX_TICK_ARRAY_CROSSINGS,
        }
    }

    #[inline]
    pub fn with_sqrt_price_limit(mut self, sqrt_price_limit: u128) -> Self {
        self.sqrt_price_limit = Some(sqrt_price_limit);
        self
    }

    #[inline]
    pub fn with_max_tick_array_crossings(mut self, max_tick_array_crossings: usize) -> Self {
        self.max_tick_array_crossings = max_tick_array_crossings;
        self
    }
}

/// Resolves the price limit of a swap, rejecting limits on the wrong side
/// of the current price or outside the protocol bounds.
pub fn resolve_sqrt_price_limit(
    sqrt_price_current: u128,
    a_to_b: bool,
    sqrt_price_limit: Option<u128>,
) -> Result<u128, QuoteError> {
    let Some(limit) = sqrt_price_limit else {
        return Ok(if a_to_b { MIN_SQRT_PRICE } else { MAX_SQRT_PRICE });
    };

    let in_bounds = (MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&limit);
    let in_direction = if a_to_b {
        limit < sqrt_price_current
    } else {
        limit > sqrt_price_current
    };
    if unlikely(!in_bounds || !in_direction) {
        return Err(QuoteError::InvalidSqrtPriceLimit(limit));
    }
    Ok(limit)
}

/// The simulated outcome of a swap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SwapSimulation {
    pub amount_in: u64,
    pub amount_out: u64,
    pub fee_amount: u64,
    pub end_sqrt_price: u128,
    pub end_tick_index: i32,
    pub end_liquidity: u128,
    /// Pages moved past, counted from the first page of the sequence.
    pub tick_arrays_crossed: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapStatus {
    Running,
    Completed,
    Failed(QuoteError),
}

// the working copy of the pool while a swap is simulated
struct SwapState {
    // the amount remaining to be swapped in/out of the fixed side
    amount_remaining: u64,
    // the amount already swapped out/in of the other side
    amount_calculated: u64,
    // accumulated swap fees, in the input token
    fee_amount: u64,
    // current sqrt(price)
    sqrt_price: u128,
    // the tick associated with the current price
    tick_current_index: i32,
    // the current liquidity in range
    liquidity: u128,
    // the page of the sequence the next search starts in
    array_index: usize,
}

struct StepComputations {
    // the page holding the next tick
    array_index: usize,
    // the next tick to swap to from the current tick in the swap direction
    tick_next: i32,
    // sqrt(price) for the next tick
    sqrt_price_next: u128,
    // the price this step swaps toward, the next tick capped at the limit
    sqrt_price_target: u128,
}

impl SwapState {
    fn step(
        &mut self,
        pool: &Whirlpool,
        tick_arrays: &TickArraySequence,
        params: &SwapParams,
        sqrt_price_limit: u128,
    ) -> SwapStatus {
        match self.try_step(pool, tick_arrays, params, sqrt_price_limit) {
            Ok(status) => status,
            Err(err) => SwapStatus::Failed(err),
        }
    }

    fn try_step(
        &mut self,
        pool: &Whirlpool,
        tick_arrays: &TickArraySequence,
        params: &SwapParams,
        sqrt_price_limit: u128,
    ) -> Result<SwapStatus, QuoteError> {
        let a_to_b = params.a_to_b;

        if self.amount_remaining == 0 || self.sqrt_price == sqrt_price_limit {
            // stopping at the default limit, the protocol bound, with amount
            // left means the pool ran out of liquidity
            if self.amount_remaining > 0 && params.sqrt_price_limit.is_none() {
                return Err(QuoteError::NotFound);
            }
            return Ok(SwapStatus::Completed);
        }

        if self.array_index > params.max_tick_array_crossings {
            return Err(QuoteError::TooManyCrossings {
                crossed: self.array_index,
                max: params.max_tick_array_crossings,
            });
        }

        let (array_index, tick_next) =
            tick_arrays.next_initialized_tick(self.tick_current_index, self.array_index)?;
        let sqrt_price_next = tick_index_to_sqrt_price(tick_next)?;
        let step = StepComputations {
            array_index,
            tick_next,
            sqrt_price_next,
            sqrt_price_target: if a_to_b {
                sqrt_price_next.max(sqrt_price_limit)
            } else {
                sqrt_price_next.min(sqrt_price_limit)
            },
        };

        let swap = compute_swap_step(
            self.amount_remaining,
            pool.fee_rate,
            self.liquidity,
            self.sqrt_price,
            step.sqrt_price_target,
            params.amount_specified_is_input,
            a_to_b,
        )?;

        trace!(
            tick_next = step.tick_next,
            liquidity = self.liquidity,
            amount_in = swap.amount_in,
            amount_out = swap.amount_out,
            fee_amount = swap.fee_amount,
            next_sqrt_price = swap.next_sqrt_price,
            "swap step"
        );

        if params.amount_specified_is_input {
            let consumed = swap
                .amount_in
                .checked_add(swap.fee_amount)
                .ok_or(QuoteError::AmountExceedsMax)?;
            self.amount_remaining = self
                .amount_remaining
                .checked_sub(consumed)
                .ok_or(MathError::Underflow)?;
            self.amount_calculated = self
                .amount_calculated
                .checked_add(swap.amount_out)
                .ok_or(QuoteError::AmountExceedsMax)?;
        } else {
            self.amount_remaining = self
                .amount_remaining
                .checked_sub(swap.amount_out)
                .ok_or(MathError::Underflow)?;
            self.amount_calculated = self
                .amount_calculated
                .checked_add(swap.amount_in)
                .and_then(|amount| amount.checked_add(swap.fee_amount))
                .ok_or(QuoteError::AmountExceedsMax)?;
        }
        self.fee_amount = self
            .fee_amount
            .checked_add(swap.fee_amount)
            .ok_or(QuoteError::AmountExceedsMax)?;

        if swap.next_sqrt_price == step.sqrt_price_next {
            if let Some(tick) = tick_arrays.initialized_tick(step.array_index, step.tick_next) {
                self.liquidity =
                    liquidity_after_crossing(self.liquidity, tick.liquidity_net, a_to_b)?;
            }

            // leaving through the far edge of a page moves the search on
            let offset = tick_arrays.tick_offset(step.array_index, step.tick_next);
            let crossed_page = if a_to_b {
                offset == Some(0)
            } else {
                offset == Some(TICK_ARRAY_SIZE as isize - 1)
            };
            self.array_index = if crossed_page {
                step.array_index + 1
            } else {
                step.array_index
            };
            self.tick_current_index = next_current_tick_index(step.tick_next, a_to_b);
        } else if swap.next_sqrt_price != self.sqrt_price {
            self.tick_current_index = sqrt_price_to_tick_index(swap.next_sqrt_price)?;
        }
        self.sqrt_price = swap.next_sqrt_price;

        Ok(SwapStatus::Running)
    }
}

impl Whirlpool {
    /// Simulates a swap against this pool snapshot, walking the pre-fetched
    /// `tick_arrays` in swap direction.
    pub fn swap(
        &self,
        tick_arrays: &TickArraySequence,
        params: SwapParams,
    ) -> Result<SwapSimulation, QuoteError> {
        if unlikely(params.amount == 0) {
            return Err(QuoteError::ZeroTradableAmount);
        }
        self.validate()?;
        if tick_arrays.a_to_b() != params.a_to_b {
            return Err(QuoteError::InvalidInput(
                "tick array sequence runs against the swap direction".to_string(),
            ));
        }

        let sqrt_price_limit =
            resolve_sqrt_price_limit(self.sqrt_price, params.a_to_b, params.sqrt_price_limit)?;

        let mut state = SwapState {
            amount_remaining: params.amount,
            amount_calculated: 0,
            fee_amount: 0,
            sqrt_price: self.sqrt_price,
            tick_current_index: self.tick_current_index,
            liquidity: self.liquidity,
            array_index: 0,
        };

        loop {
            match state.step(self, tick_arrays, &params, sqrt_price_limit) {
                SwapStatus::Running => continue,
                SwapStatus::Completed => break,
                SwapStatus::Failed(err) => return Err(err),
            }
        }

        let amount_traded = params.amount - state.amount_remaining;
        let (amount_in, amount_out) = if params.amount_specified_is_input {
            (amount_traded, state.amount_calculated)
        } else {
            (state.amount_calculated, amount_traded)
        };

        let tick_arrays_crossed = tick_arrays
            .page_index(state.tick_current_index)
            .unwrap_or(state.array_index);

        Ok(SwapSimulation {
            amount_in,
            amount_out,
            fee_amount: state.fee_amount,
            end_sqrt_price: state.sqrt_price,
            end_tick_index: state.tick_current_index,
            end_liquidity: state.liquidity,
            tick_arrays_crossed,
        })
    }
}
