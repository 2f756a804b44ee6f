use crate::error::MathError;

/// Returns the index (0–127) of the most significant set bit of a Q64.64
/// value, or `MathError::ZeroValue` if the input is zero.
///
/// The integer part of `log2(sqrt_price)` is `msb - 64`.
pub fn most_significant_bit(x: u128) -> Result<u32, MathError> {
    if x == 0 {
        return Err(MathError::ZeroValue);
    }
    Ok(127 - x.leading_zeros())
}
