//! Quote orchestration: fetch a pool snapshot, simulate the swap and bound
//! the counter-amount by the slippage tolerance.

pub mod slippage;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::config::QuoterConfig;
use crate::error::{Error, QuoteError};
use crate::pool::data_source::PoolDataSource;
use crate::pool::swap::SwapParams;
use crate::pool::tick_array::{TickArrayPage, TickArraySequence, tick_array_start_indices_for_swap};
use crate::pool::whirlpool::Whirlpool;
use crate::Address;
use slippage::{SlippageTolerance, other_amount_threshold};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwapDirection {
    AToB,
    BToA,
}

impl SwapDirection {
    #[inline]
    pub fn is_a_to_b(&self) -> bool {
        matches!(self, SwapDirection::AToB)
    }
}

impl From<bool> for SwapDirection {
    fn from(a_to_b: bool) -> Self {
        if a_to_b { SwapDirection::AToB } else { SwapDirection::BToA }
    }
}

/// Which side of the swap the requested amount fixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixedSide {
    Input,
    Output,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapQuoteRequest {
    pub pool_address: Address,
    /// Mint of the token sold into the pool, for either fixed side.
    pub input_mint: Address,
    pub amount: u64,
    pub amount_specified_is_input: bool,
    /// `None` uses the quoter's default tolerance.
    pub slippage_tolerance: Option<SlippageTolerance>,
    /// `None` uses the protocol bound in the swap direction.
    pub sqrt_price_limit: Option<u128>,
}

impl SwapQuoteRequest {
    /// Sell exactly `amount` of `input_mint`.
    pub fn exact_input(pool_address: Address, input_mint: Address, amount: u64) -> Self {
        Self {
            pool_address,
            input_mint,
            amount,
            amount_specified_is_input: true,
            slippage_tolerance: None,
            sqrt_price_limit: None,
        }
    }

    /// Buy exactly `amount` of the pool's other token with `input_mint`.
    pub fn exact_output(pool_address: Address, input_mint: Address, amount: u64) -> Self {
        Self {
            amount_specified_is_input: false,
            ..Self::exact_input(pool_address, input_mint, amount)
        }
    }

    pub fn with_slippage_tolerance(mut self, slippage_tolerance: SlippageTolerance) -> Self {
        self.slippage_tolerance = Some(slippage_tolerance);
        self
    }

    pub fn with_sqrt_price_limit(mut self, sqrt_price_limit: u128) -> Self {
        self.sqrt_price_limit = Some(sqrt_price_limit);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapQuoteResult {
    pub estimated_amount_in: u64,
    pub estimated_amount_out: u64,
    pub estimated_fee_amount: u64,
    /// Minimum output for a fixed input, maximum input for a fixed output.
    pub other_amount_threshold: u64,
    /// Limit to pass to the swap instruction, the price the simulation ended at.
    pub sqrt_price_limit: u128,
    pub estimated_end_sqrt_price: u128,
    pub estimated_end_tick_index: i32,
    /// Echo of the requested amount.
    pub amount: u64,
    pub direction: SwapDirection,
    pub fixed_side: FixedSide,
    /// Tick arrays the swap instruction must load, in traversal order.
    pub tick_array_addresses: Vec<Address>,
}

/// Quotes `request` against an already fetched snapshot.
///
/// `tick_arrays` must have been built for the direction `request` implies.
/// The returned `tick_array_addresses` is empty, only the [`Quoter`] knows
/// how addresses are derived.
pub fn quote_swap(
    pool: &Whirlpool,
    tick_arrays: &TickArraySequence,
    request: &SwapQuoteRequest,
    config: &QuoterConfig,
) -> Result<SwapQuoteResult, QuoteError> {
    let a_to_b = pool.a_to_b_for_input(&request.input_mint)?;

    let mut params = SwapParams::new(request.amount, request.amount_specified_is_input, a_to_b)
        .with_max_tick_array_crossings(config.max_tick_array_crossings());
    if let Some(limit) = request.sqrt_price_limit {
        params = params.with_sqrt_price_limit(limit);
    }

    let simulation = pool.swap(tick_arrays, params)?;

    let fixed_side = if request.amount_specified_is_input {
        FixedSide::Input
    } else {
        FixedSide::Output
    };
    let slippage_tolerance = request
        .slippage_tolerance
        .unwrap_or_else(|| config.default_slippage());
    let other_amount_threshold = other_amount_threshold(
        fixed_side,
        simulation.amount_in,
        simulation.amount_out,
        slippage_tolerance,
    )?;

    Ok(SwapQuoteResult {
        estimated_amount_in: simulation.amount_in,
        estimated_amount_out: simulation.amount_out,
        estimated_fee_amount: simulation.fee_amount,
        other_amount_threshold,
        sqrt_price_limit: simulation.end_sqrt_price,
        estimated_end_sqrt_price: simulation.end_sqrt_price,
        estimated_end_tick_index: simulation.end_tick_index,
        amount: request.amount,
        direction: a_to_b.into(),
        fixed_side,
        tick_array_addresses: Vec::new(),
    })
}

/// Produces swap quotes from snapshots served by a [`PoolDataSource`].
///
/// Every quote fetches a fresh snapshot, nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Quoter<D> {
    source: D,
    config: QuoterConfig,
}

impl<D: PoolDataSource> Quoter<D> {
    pub fn new(source: D, config: QuoterConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn config(&self) -> &QuoterConfig {
        &self.config
    }

    pub async fn quote(&self, request: &SwapQuoteRequest) -> Result<SwapQuoteResult, Error> {
        debug!(
            pool = %request.pool_address,
            input_mint = %request.input_mint,
            amount = request.amount,
            amount_specified_is_input = request.amount_specified_is_input,
            "quoting swap"
        );

        let result = self.try_quote(request).await;
        match &result {
            Ok(quote) => debug!(
                pool = %request.pool_address,
                direction = ?quote.direction,
                amount_in = quote.estimated_amount_in,
                amount_out = quote.estimated_amount_out,
                other_amount_threshold = quote.other_amount_threshold,
                "swap quoted"
            ),
            Err(Error::Quote(err @ (QuoteError::NotFound | QuoteError::TooManyCrossings { .. }))) => {
                warn!(pool = %request.pool_address, amount = request.amount, error = %err, "swap cannot be quoted")
            }
            Err(err) => debug!(pool = %request.pool_address, error = %err, "quote failed"),
        }
        result
    }

    /// Quotes independent requests concurrently. Results keep the order of
    /// `requests`.
    pub async fn quote_many(
        &self,
        requests: &[SwapQuoteRequest],
    ) -> Vec<Result<SwapQuoteResult, Error>> {
        join_all(requests.iter().map(|request| self.quote(request))).await
    }

    async fn try_quote(&self, request: &SwapQuoteRequest) -> Result<SwapQuoteResult, Error> {
        let pool = self
            .source
            .get_pool(&request.pool_address)
            .await
            .map_err(|err| Error::DataSource(Box::new(err)))?
            .ok_or(QuoteError::DataUnavailable(request.pool_address))?;
        pool.validate()?;

        let a_to_b = pool.a_to_b_for_input(&request.input_mint)?;
        let start_indices = tick_array_start_indices_for_swap(
            pool.tick_current_index,
            pool.tick_spacing,
            a_to_b,
            self.config.max_tick_array_crossings() + 1,
        )?;
        let addresses: Vec<Address> = start_indices
            .iter()
            .map(|start_tick_index| {
                self.source
                    .tick_array_address(&request.pool_address, *start_tick_index)
            })
            .collect();

        let mut fetched = self
            .source
            .get_tick_arrays(&addresses)
            .await
            .map_err(|err| Error::DataSource(Box::new(err)))?;

        // a page that was never created on chain has no initialized ticks
        let pages = start_indices
            .iter()
            .zip(&addresses)
            .map(|(&start_tick_index, address)| match fetched.remove(address) {
                Some(tick_array) if tick_array.start_tick_index == start_tick_index => {
                    Ok(TickArrayPage::Loaded(tick_array))
                }
                Some(tick_array) => Err(QuoteError::InvalidInput(format!(
                    "tick array {address} starts at {}, expected {start_tick_index}",
                    tick_array.start_tick_index
                ))),
                None => Ok(TickArrayPage::Uninitialized { start_tick_index }),
            })
            .collect::<Result<Vec<_>, QuoteError>>()?;
        let sequence = TickArraySequence::new(pages, pool.tick_spacing, a_to_b)?;

        let mut quote = quote_swap(&pool, &sequence, request, &self.config)?;
        quote.tick_array_addresses = addresses;
        Ok(quote)
    }
}
