use crate::MAX_TICK_ARRAY_CROSSINGS;
use crate::quote::slippage::SlippageTolerance;

/// Settings shared by every quote a [`crate::Quoter`] produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuoterConfig {
    max_tick_array_crossings: usize,
    default_slippage: SlippageTolerance,
}

impl Default for QuoterConfig {
    fn default() -> Self {
        Self {
            max_tick_array_crossings: MAX_TICK_ARRAY_CROSSINGS,
            default_slippage: SlippageTolerance::from_bps(100),
        }
    }
}

impl QuoterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick arrays a swap may move past beyond the first. The quoter
    /// fetches one more page than this.
    pub fn with_max_tick_array_crossings(mut self, max_tick_array_crossings: usize) -> Self {
        self.max_tick_array_crossings = max_tick_array_crossings;
        self
    }

    /// Tolerance applied to requests that do not carry their own.
    pub fn with_default_slippage(mut self, default_slippage: SlippageTolerance) -> Self {
        self.default_slippage = default_slippage;
        self
    }

    pub fn max_tick_array_crossings(&self) -> usize {
        self.max_tick_array_crossings
    }

    pub fn default_slippage(&self) -> SlippageTolerance {
        self.default_slippage
    }
}
