use crate::Address;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Math error - overflow")]
    Overflow,
    #[error("Math error - underflow")]
    Underflow,
    #[error("Math error - division by zero")]
    DivisionByZero,
    #[error("BitMath error - zero input value")]
    ZeroValue,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("Range error - tick index {0} is outside the protocol bounds")]
    TickIndex(i32),
    #[error("Range error - sqrt price {0} is outside the protocol bounds")]
    SqrtPrice(u128),
    #[error("Range error - tick array start index {0} is outside the protocol bounds")]
    TickArrayStart(i32),
    #[error("Range error - tick {tick_index} is not in the tick array starting at {start_tick_index}")]
    TickNotInArray {
        tick_index: i32,
        start_tick_index: i32,
    },
    #[error("Range error - tick {tick_index} is not a multiple of tick spacing {tick_spacing}")]
    TickNotAligned { tick_index: i32, tick_spacing: u16 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error(transparent)]
    OutOfRange(#[from] RangeError),

    #[error("Quote error - no initialized tick within reach, liquidity is insufficient")]
    NotFound,

    #[error("Quote error - swap needs to cross {crossed} tick arrays, at most {max} can be loaded")]
    TooManyCrossings { crossed: usize, max: usize },

    #[error("Quote error - no account data for {0}")]
    DataUnavailable(Address),

    #[error("Quote error - invalid input: {0}")]
    InvalidInput(String),

    #[error("Quote error - tradable amount is zero")]
    ZeroTradableAmount,

    #[error("Quote error - sqrt price limit {0} is invalid for the swap direction")]
    InvalidSqrtPriceLimit(u128),

    #[error("Quote error - token amount exceeds u64")]
    AmountExceedsMax,

    #[error(transparent)]
    Math(#[from] MathError),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error("Data source error - {0}")]
    DataSource(#[source] Box<dyn std::error::Error + Send + Sync>),
}
