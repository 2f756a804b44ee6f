use crate::error::MathError;

/// Applies a signed liquidity delta to the active liquidity.
pub fn add_liquidity_delta(liquidity: u128, delta: i128) -> Result<u128, MathError> {
    if delta < 0 {
        liquidity
            .checked_sub(delta.unsigned_abs())
            .ok_or(MathError::Underflow)
    } else {
        liquidity
            .checked_add(delta as u128)
            .ok_or(MathError::Overflow)
    }
}

/// Active liquidity after crossing an initialized tick.
///
/// `liquidity_net` is stored for upward crossings, so moving down
/// (A to B) applies its negation.
pub fn liquidity_after_crossing(
    liquidity: u128,
    liquidity_net: i128,
    a_to_b: bool,
) -> Result<u128, MathError> {
    if a_to_b {
        // -liquidity_net, without overflowing on i128::MIN
        if liquidity_net < 0 {
            liquidity
                .checked_add(liquidity_net.unsigned_abs())
                .ok_or(MathError::Overflow)
        } else {
            liquidity
                .checked_sub(liquidity_net as u128)
                .ok_or(MathError::Underflow)
        }
    } else {
        add_liquidity_delta(liquidity, liquidity_net)
    }
}
