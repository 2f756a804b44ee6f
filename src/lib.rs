//! Off-chain swap quoting for Whirlpool-style concentrated liquidity pools.
//!
//! This crate exposes:
//! - Fixed-point math primitives (`math::*`) for ticks, Q64.64 prices and
//!   token amounts, matching the on-chain program bit for bit.
//! - Pool snapshot types and tick array navigation (`pool::*`), plus a swap
//!   simulator that walks the pre-fetched tick arrays.
//! - A [`Quoter`] that fetches snapshots through a [`PoolDataSource`] and
//!   turns a simulated swap into a slippage-adjusted quote.
//!
//! # Examples
//!
//! ## Pure math
//! ```no_run
//! use clmm_swap_quote::math::tick_math;
//!
//! let sqrt_price = tick_math::tick_index_to_sqrt_price(0).unwrap();
//! assert_eq!(sqrt_price, 1u128 << 64);
//! ```
//!
//! ## Quoting against an in-memory snapshot
//! ```no_run
//! use clmm_swap_quote::{
//!     Address, InMemoryDataSource, Quoter, QuoterConfig, SwapQuoteRequest, Whirlpool,
//! };
//!
//! # async fn run() -> Result<(), clmm_swap_quote::error::Error> {
//! let pool_address = Address::repeat_byte(1);
//! let mint_a = Address::repeat_byte(2);
//! let mint_b = Address::repeat_byte(3);
//!
//! let mut pool = Whirlpool::new(mint_a, mint_b, 64, 3000);
//! pool.liquidity = 1_000_000_000_000;
//!
//! let mut source = InMemoryDataSource::new();
//! source.insert_pool(pool_address, pool);
//!
//! let quoter = Quoter::new(source, QuoterConfig::default());
//! let quote = quoter
//!     .quote(&SwapQuoteRequest::exact_input(pool_address, mint_b, 1_000_000))
//!     .await?;
//! println!("out: {}, min out: {}", quote.estimated_amount_out, quote.other_amount_threshold);
//! # Ok(())
//! # }
//! ```

use alloy_primitives::U256;

/// Opaque 32-byte account identifier.
pub type Address = alloy_primitives::B256;

pub mod config;
pub mod error;
mod hash;
pub mod math;
pub mod pool;
pub mod quote;

pub use config::QuoterConfig;
pub use hash::FastMap;
pub use pool::data_source::{InMemoryDataSource, PoolDataSource};
pub use pool::whirlpool::{Tick, TickArray, Whirlpool};
pub use quote::slippage::SlippageTolerance;
pub use quote::{FixedSide, Quoter, SwapDirection, SwapQuoteRequest, SwapQuoteResult, quote_swap};

pub const Q64_RESOLUTION: u8 = 64;

/// Fee rates are expressed in millionths.
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;
pub(crate) const U256_FEE_RATE_DENOMINATOR: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

/// Initializable ticks held by one tick array account.
pub const TICK_ARRAY_SIZE: usize = 88;

/// Tick arrays a swap may move past beyond the one holding the current tick.
pub const MAX_TICK_ARRAY_CROSSINGS: usize = 2;
