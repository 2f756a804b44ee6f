#![allow(dead_code)]

use std::hint::black_box;

use alloy_primitives::U256;
use clmm_swap_quote::math::math_helpers::{mul_div, mul_shift_right};
use clmm_swap_quote::math::sqrt_price_math::{get_amount_delta_a, get_next_sqrt_price};
use clmm_swap_quote::math::swap_math::compute_swap_step;
use clmm_swap_quote::math::tick_math::{sqrt_price_to_tick_index, tick_index_to_sqrt_price};
use clmm_swap_quote::pool::swap::SwapParams;
use clmm_swap_quote::pool::tick_array::{
    TickArrayPage, TickArraySequence, tick_array_start_indices_for_swap,
};
use clmm_swap_quote::{
    Address, InMemoryDataSource, Quoter, QuoterConfig, SwapQuoteRequest, Tick, TickArray,
    Whirlpool,
};
use criterion::Criterion;

const ONE_X64: u128 = 1 << 64;
const LIQUIDITY: u128 = 1_000_000_000_000;

pub fn bench_tick_math(c: &mut Criterion) {
    c.bench_function("tick_index_to_sqrt_price", |b| {
        b.iter(|| tick_index_to_sqrt_price(black_box(-123_456)))
    });
    let sqrt_price = 79226673515401279992447579055 / 7;
    c.bench_function("sqrt_price_to_tick_index", |b| {
        b.iter(|| sqrt_price_to_tick_index(black_box(sqrt_price)))
    });
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    let upper = ONE_X64 + (ONE_X64 >> 4);
    c.bench_function("get_amount_delta_a", |b| {
        b.iter(|| get_amount_delta_a(black_box(ONE_X64), black_box(upper), LIQUIDITY, true))
    });
    c.bench_function("get_next_sqrt_price", |b| {
        b.iter(|| get_next_sqrt_price(black_box(ONE_X64), LIQUIDITY, black_box(1_000_000), true, true))
    });
}

pub fn bench_swap_math(c: &mut Criterion) {
    let target = ONE_X64 - (ONE_X64 >> 8);
    c.bench_function("compute_swap_step", |b| {
        b.iter(|| {
            compute_swap_step(black_box(1_000_000), 3000, LIQUIDITY, ONE_X64, target, true, true)
        })
    });
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let a = U256::from(u128::MAX);
    let denominator = U256::from(u64::MAX);
    c.bench_function("mul_div", |b| b.iter(|| mul_div(black_box(a), black_box(a), denominator)));
    c.bench_function("mul_shift_right", |b| {
        b.iter(|| mul_shift_right(black_box(LIQUIDITY), black_box(ONE_X64), 64, true))
    });
}

fn laddered_tick_array(start_tick_index: i32) -> TickArray {
    let mut tick_array = TickArray::new(start_tick_index);
    for offset in (0..88).step_by(8) {
        tick_array.ticks[offset] = Tick::with_liquidity_net(LIQUIDITY as i128);
    }
    tick_array
}

/// A tick spacing 8 pool with an initialized tick every 64 ticks below the
/// current price.
fn laddered_pool() -> (Whirlpool, TickArraySequence) {
    let mut pool = Whirlpool::new(Address::repeat_byte(0xaa), Address::repeat_byte(0xbb), 8, 3000);
    pool.liquidity = 100 * LIQUIDITY;

    let pages = tick_array_start_indices_for_swap(0, 8, true, 3)
        .unwrap_or_default()
        .into_iter()
        .map(|start_tick_index| TickArrayPage::Loaded(laddered_tick_array(start_tick_index)))
        .collect();
    let sequence = TickArraySequence::new(pages, 8, true).expect("valid sequence");
    (pool, sequence)
}

pub fn bench_swap(c: &mut Criterion) {
    let (pool, sequence) = laddered_pool();
    c.bench_function("swap_crossing_ticks", |b| {
        b.iter(|| pool.swap(&sequence, SwapParams::new(black_box(20_000_000_000), true, true)))
    });
}

pub fn bench_quote(c: &mut Criterion) {
    let Ok(runtime) = tokio::runtime::Builder::new_current_thread().build() else {
        return;
    };
    let pool_address = Address::repeat_byte(0x01);
    let (pool, sequence) = laddered_pool();

    let mut source = InMemoryDataSource::new();
    source.insert_pool(pool_address, pool.clone());
    for start_tick_index in sequence.start_tick_indices() {
        source.insert_tick_array(&pool_address, laddered_tick_array(start_tick_index));
    }
    let quoter = Quoter::new(source, QuoterConfig::default());
    let request = SwapQuoteRequest::exact_input(pool_address, pool.token_mint_a, 20_000_000_000);

    c.bench_function("quote_in_memory", |b| {
        b.iter(|| runtime.block_on(quoter.quote(black_box(&request))))
    });
}
