use crate::error::{QuoteError, RangeError};
use crate::math::bit_math::most_significant_bit;
use crate::math::math_helpers::u256_to_u128;
use alloy_primitives::U256;

pub const MIN_TICK_INDEX: i32 = -443636;
pub const MAX_TICK_INDEX: i32 = -MIN_TICK_INDEX;

pub const MIN_SQRT_PRICE: u128 = 4295048016;
pub const MAX_SQRT_PRICE: u128 = 79226673515401279992447579055;

// log_b(2) for b = 1.0001^0.5, Q32.32
const LOG_B_2_X32: i128 = 59543866431248;
const LOG_B_P_ERR_MARGIN_LOWER_X64: i128 = 184467440737095516;
const LOG_B_P_ERR_MARGIN_UPPER_X64: i128 = 15793534762490258745;

/// Returns the Q64.64 sqrt price at a tick index, or
/// `RangeError::TickIndex` outside `[MIN_TICK_INDEX, MAX_TICK_INDEX]`.
///
/// Positive ticks accumulate in Q32.96 and drop the extra 32 bits at the end,
/// negative ticks accumulate directly in Q64.64. Every shift truncates.
pub fn tick_index_to_sqrt_price(tick_index: i32) -> Result<u128, QuoteError> {
    if !is_tick_index_in_bounds(tick_index) {
        return Err(RangeError::TickIndex(tick_index).into());
    }

    if tick_index >= 0 {
        sqrt_price_positive_tick(tick_index as u32)
    } else {
        Ok(sqrt_price_negative_tick(tick_index.unsigned_abs()))
    }
}

fn sqrt_price_positive_tick(tick: u32) -> Result<u128, QuoteError> {
    let mut ratio = if tick & 1 != 0 {
        U256::from(79232123823359799118286999567u128)
    } else {
        U256::from(79228162514264337593543950336u128)
    };

    macro_rules! apply_multiplier {
        ($bit:expr, $factor:expr) => {
            if tick & $bit != 0 {
                ratio = ratio.wrapping_mul(U256::from($factor as u128)) >> 96;
            }
        };
    }

    apply_multiplier!(2, 79236085330515764027303304731u128);
    apply_multiplier!(4, 79244008939048815603706035061u128);
    apply_multiplier!(8, 79259858533276714757314932305u128);
    apply_multiplier!(16, 79291567232598584799939703904u128);
    apply_multiplier!(32, 79355022692464371645785046466u128);
    apply_multiplier!(64, 79482085999252804386437311141u128);
    apply_multiplier!(128, 79736823300114093921829183326u128);
    apply_multiplier!(256, 80248749790819932309965073892u128);
    apply_multiplier!(512, 81282483887344747381513967011u128);
    apply_multiplier!(1024, 83390072131320151908154831281u128);
    apply_multiplier!(2048, 87770609709833776024991924138u128);
    apply_multiplier!(4096, 97234110755111693312479820773u128);
    apply_multiplier!(8192, 119332217159966728226237229890u128);
    apply_multiplier!(16384, 179736315981702064433883588727u128);
    apply_multiplier!(32768, 407748233172238350107850275304u128);
    apply_multiplier!(65536, 2098478828474011932436660412517u128);
    apply_multiplier!(131072, 55581415166113811149459800483533u128);
    apply_multiplier!(262144, 38992368544603139932233054999993551u128);

    Ok(u256_to_u128(ratio >> 32)?)
}

fn sqrt_price_negative_tick(tick: u32) -> u128 {
    let mut ratio: u128 = if tick & 1 != 0 {
        18445821805675392311
    } else {
        18446744073709551616
    };

    // ratio <= 2^64 and every factor is below 2^64, so products fit in u128
    macro_rules! apply_multiplier {
        ($bit:expr, $factor:expr) => {
            if tick & $bit != 0 {
                ratio = (ratio * $factor) >> 64;
            }
        };
    }

    apply_multiplier!(2, 18444899583751176498u128);
    apply_multiplier!(4, 18443055278223354162u128);
    apply_multiplier!(8, 18439367220385604838u128);
    apply_multiplier!(16, 18431993317065449817u128);
    apply_multiplier!(32, 18417254355718160513u128);
    apply_multiplier!(64, 18387811781193591352u128);
    apply_multiplier!(128, 18329067761203520168u128);
    apply_multiplier!(256, 18212142134806087854u128);
    apply_multiplier!(512, 17980523815641551639u128);
    apply_multiplier!(1024, 17526086738831147013u128);
    apply_multiplier!(2048, 16651378430235024244u128);
    apply_multiplier!(4096, 15030750278693429944u128);
    apply_multiplier!(8192, 12247334978882834399u128);
    apply_multiplier!(16384, 8131365268884726200u128);
    apply_multiplier!(32768, 3584323654723342297u128);
    apply_multiplier!(65536, 696457651847595233u128);
    apply_multiplier!(131072, 26294789957452057u128);
    apply_multiplier!(262144, 37481735321082u128);

    ratio
}

/// Computes the greatest tick index whose sqrt price is `<= sqrt_price`,
/// or `RangeError::SqrtPrice` outside `[MIN_SQRT_PRICE, MAX_SQRT_PRICE]`.
///
/// The log2 estimate carries 14 fractional bits. The two candidate ticks
/// bracketing the error margin are resolved by recomputing the sqrt price
/// of the higher one.
pub fn sqrt_price_to_tick_index(sqrt_price: u128) -> Result<i32, QuoteError> {
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price) {
        return Err(RangeError::SqrtPrice(sqrt_price).into());
    }

    let msb = most_significant_bit(sqrt_price)?;
    let log2_integer_x32 = (msb as i128 - 64) << 32;

    // normalise into [2^63, 2^64) so squaring stays within u128
    let mut r = if msb >= 64 {
        sqrt_price >> (msb - 63)
    } else {
        sqrt_price << (63 - msb)
    };
    let mut log2_fraction_x64: i128 = 0;

    // 14 fractional bits, one per squaring
    let mut bit: i128 = 1 << 63;
    let mut precision = 0;
    while bit > 0 && precision < 14 {
        r *= r;
        let is_r_more_than_two = (r >> 127) as u32;
        r >>= 63 + is_r_more_than_two;
        log2_fraction_x64 += bit * i128::from(is_r_more_than_two);
        bit >>= 1;
        precision += 1;
    }

    let log2_x32 = log2_integer_x32 + (log2_fraction_x64 >> 32);
    let log_b_x64 = log2_x32 * LOG_B_2_X32;

    let tick_low = i32::try_from((log_b_x64 - LOG_B_P_ERR_MARGIN_LOWER_X64) >> 64)
        .map_err(|_| RangeError::SqrtPrice(sqrt_price))?;
    let tick_high = i32::try_from((log_b_x64 + LOG_B_P_ERR_MARGIN_UPPER_X64) >> 64)
        .map_err(|_| RangeError::SqrtPrice(sqrt_price))?;

    Ok(if tick_low == tick_high {
        tick_low
    } else if tick_index_to_sqrt_price(tick_high)? <= sqrt_price {
        tick_high
    } else {
        tick_low
    })
}

#[inline]
pub fn is_tick_index_in_bounds(tick_index: i32) -> bool {
    (MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick_index)
}

/// Rounds a tick down to the nearest multiple of `tick_spacing`.
pub fn get_initializable_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let spacing = i32::from(tick_spacing);
    tick_index.div_euclid(spacing) * spacing
}

/// The closest initializable tick strictly below `tick_index`.
pub fn get_prev_initializable_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let spacing = i32::from(tick_spacing);
    let floor = get_initializable_tick_index(tick_index, tick_spacing);
    if floor == tick_index {
        floor - spacing
    } else {
        floor
    }
}

/// The closest initializable tick strictly above `tick_index`.
pub fn get_next_initializable_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    get_initializable_tick_index(tick_index, tick_spacing) + i32::from(tick_spacing)
}
