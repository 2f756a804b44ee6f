use crate::TICK_ARRAY_SIZE;
use crate::error::{QuoteError, RangeError};
use crate::math::tick_math::{MAX_TICK_INDEX, MIN_TICK_INDEX};
use crate::pool::whirlpool::{Tick, TickArray};

#[inline]
fn ticks_in_array(tick_spacing: u16) -> Result<i32, QuoteError> {
    if tick_spacing == 0 {
        return Err(QuoteError::InvalidInput("tick spacing is zero".to_string()));
    }
    Ok(i32::from(tick_spacing) * TICK_ARRAY_SIZE as i32)
}

/// Whether `start_tick_index` is a page start that can exist on chain.
pub fn is_valid_start_tick_index(start_tick_index: i32, tick_spacing: u16) -> bool {
    let Ok(ticks_in_array) = ticks_in_array(tick_spacing) else {
        return false;
    };
    // the page holding MIN_TICK_INDEX starts below it
    let min_start = MIN_TICK_INDEX - ((MIN_TICK_INDEX % ticks_in_array) + ticks_in_array);

    start_tick_index % ticks_in_array == 0
        && start_tick_index >= min_start
        && start_tick_index <= MAX_TICK_INDEX
}

/// The start of the page `page_offset` pages away from the one holding
/// `tick_index`.
pub fn start_tick_index_for(
    tick_index: i32,
    tick_spacing: u16,
    page_offset: i32,
) -> Result<i32, QuoteError> {
    let ticks_in_array = ticks_in_array(tick_spacing)?;
    let start_tick_index = tick_index
        .div_euclid(ticks_in_array)
        .checked_add(page_offset)
        .and_then(|page| page.checked_mul(ticks_in_array))
        .ok_or(RangeError::TickArrayStart(i32::MIN))?;

    if !is_valid_start_tick_index(start_tick_index, tick_spacing) {
        return Err(RangeError::TickArrayStart(start_tick_index).into());
    }
    Ok(start_tick_index)
}

/// The ordered page starts a swap from `tick_current_index` may traverse,
/// at most `count` of them.
///
/// A to B walks down from the page holding the current tick. B to A looks
/// one tick spacing ahead first, so a price resting just below a page
/// boundary starts in the next page. The list stops early at the protocol
/// bounds, but the first page must exist.
pub fn tick_array_start_indices_for_swap(
    tick_current_index: i32,
    tick_spacing: u16,
    a_to_b: bool,
    count: usize,
) -> Result<Vec<i32>, QuoteError> {
    let shift = if a_to_b { 0 } else { i32::from(tick_spacing) };
    let search_index = tick_current_index
        .checked_add(shift)
        .ok_or(RangeError::TickIndex(tick_current_index))?;
    let mut start_indices = Vec::with_capacity(count);

    for page in 0..count as i32 {
        let page_offset = if a_to_b { -page } else { page };
        match start_tick_index_for(search_index, tick_spacing, page_offset) {
            Ok(start_tick_index) => start_indices.push(start_tick_index),
            Err(err) if start_indices.is_empty() => return Err(err),
            Err(_) => break,
        }
    }

    Ok(start_indices)
}

impl TickArray {
    /// Zero-based slot of the tick at or below `tick_index`. May be `-1`
    /// or `TICK_ARRAY_SIZE` for ticks just outside the page. `None` for a
    /// zero tick spacing.
    #[inline]
    pub fn tick_offset(&self, tick_index: i32, tick_spacing: u16) -> Option<isize> {
        slot_offset(self.start_tick_index, tick_index, tick_spacing)
    }

    fn slot(&self, tick_index: i32, tick_spacing: u16) -> Result<usize, QuoteError> {
        let spacing = i32::from(tick_spacing);
        if tick_spacing == 0 || tick_index % spacing != 0 {
            return Err(RangeError::TickNotAligned {
                tick_index,
                tick_spacing,
            }
            .into());
        }

        self.tick_offset(tick_index, tick_spacing)
            .and_then(|offset| usize::try_from(offset).ok())
            .filter(|offset| *offset < TICK_ARRAY_SIZE)
            .ok_or_else(|| {
                RangeError::TickNotInArray {
                    tick_index,
                    start_tick_index: self.start_tick_index,
                }
                .into()
            })
    }

    pub fn tick(&self, tick_index: i32, tick_spacing: u16) -> Result<&Tick, QuoteError> {
        let slot = self.slot(tick_index, tick_spacing)?;
        Ok(&self.ticks[slot])
    }

    /// Mutable slot lookup, for building snapshots by hand.
    pub fn tick_mut(&mut self, tick_index: i32, tick_spacing: u16) -> Result<&mut Tick, QuoteError> {
        let slot = self.slot(tick_index, tick_spacing)?;
        Ok(&mut self.ticks[slot])
    }

    /// Scans for the next initialized tick from `tick_index`.
    ///
    /// A to B scans down and includes the slot holding `tick_index`, B to A
    /// scans up starting one slot above it. Returns `QuoteError::NotFound`
    /// once the scan leaves the page.
    pub fn find_next_initialized_tick(
        &self,
        tick_index: i32,
        tick_spacing: u16,
        a_to_b: bool,
    ) -> Result<i32, QuoteError> {
        ticks_in_array(tick_spacing)?;
        let mut offset = self
            .tick_offset(tick_index, tick_spacing)
            .ok_or(RangeError::TickIndex(tick_index))?;
        if !a_to_b {
            offset += 1;
        }

        while (0..TICK_ARRAY_SIZE as isize).contains(&offset) {
            if self.ticks[offset as usize].initialized {
                return Ok(self.start_tick_index + offset as i32 * i32::from(tick_spacing));
            }
            offset += if a_to_b { -1 } else { 1 };
        }

        Err(QuoteError::NotFound)
    }
}

// floor((tick_index - start_tick_index) / tick_spacing)
#[inline]
fn slot_offset(start_tick_index: i32, tick_index: i32, tick_spacing: u16) -> Option<isize> {
    tick_index
        .checked_sub(start_tick_index)?
        .checked_div_euclid(i32::from(tick_spacing))
        .map(|offset| offset as isize)
}

/// The current tick once the price has moved onto `tick_index`: one below
/// it when moving down, the tick itself when moving up.
#[inline]
pub fn next_current_tick_index(tick_index: i32, a_to_b: bool) -> i32 {
    if a_to_b { tick_index - 1 } else { tick_index }
}

/// A page of a swap sequence. Pages whose account does not exist on chain
/// behave like pages with every tick uninitialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickArrayPage {
    Loaded(TickArray),
    Uninitialized { start_tick_index: i32 },
}

impl TickArrayPage {
    #[inline]
    pub fn start_tick_index(&self) -> i32 {
        match self {
            TickArrayPage::Loaded(tick_array) => tick_array.start_tick_index,
            TickArrayPage::Uninitialized { start_tick_index } => *start_tick_index,
        }
    }

    fn find_next_initialized_tick(
        &self,
        tick_index: i32,
        tick_spacing: u16,
        a_to_b: bool,
    ) -> Result<i32, QuoteError> {
        match self {
            TickArrayPage::Loaded(tick_array) => {
                tick_array.find_next_initialized_tick(tick_index, tick_spacing, a_to_b)
            }
            TickArrayPage::Uninitialized { .. } => Err(QuoteError::NotFound),
        }
    }
}

/// The consecutive pages a swap may traverse, ordered in swap direction.
#[derive(Debug, Clone)]
pub struct TickArraySequence {
    pages: Vec<TickArrayPage>,
    tick_spacing: u16,
    a_to_b: bool,
}

impl TickArraySequence {
    pub fn new(
        pages: Vec<TickArrayPage>,
        tick_spacing: u16,
        a_to_b: bool,
    ) -> Result<Self, QuoteError> {
        let ticks_in_array = ticks_in_array(tick_spacing)?;
        if pages.is_empty() {
            return Err(QuoteError::InvalidInput("tick array sequence is empty".to_string()));
        }

        for page in &pages {
            let start_tick_index = page.start_tick_index();
            if !is_valid_start_tick_index(start_tick_index, tick_spacing) {
                return Err(RangeError::TickArrayStart(start_tick_index).into());
            }
        }

        let step = if a_to_b { -ticks_in_array } else { ticks_in_array };
        let consecutive = pages
            .windows(2)
            .all(|pair| pair[1].start_tick_index() == pair[0].start_tick_index() + step);
        if !consecutive {
            return Err(QuoteError::InvalidInput(
                "tick arrays are not consecutive in swap direction".to_string(),
            ));
        }

        Ok(Self {
            pages,
            tick_spacing,
            a_to_b,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    #[inline]
    pub fn a_to_b(&self) -> bool {
        self.a_to_b
    }

    pub fn start_tick_indices(&self) -> Vec<i32> {
        self.pages.iter().map(TickArrayPage::start_tick_index).collect()
    }

    /// Finds the next tick to swap toward, starting in page `array_index`.
    ///
    /// Returns the page the tick lives in and the tick index. Pages without
    /// an initialized tick are skipped. The protocol bound is returned once
    /// the page holding it is reached, and the far edge of the last page when
    /// the sequence runs out.
    pub fn next_initialized_tick(
        &self,
        tick_index: i32,
        array_index: usize,
    ) -> Result<(usize, i32), QuoteError> {
        let ticks_in_array = ticks_in_array(self.tick_spacing)?;
        let mut search_index = tick_index;
        let mut array_index = array_index;

        loop {
            let page = self
                .pages
                .get(array_index)
                .ok_or(QuoteError::TooManyCrossings {
                    crossed: array_index,
                    max: self.pages.len() - 1,
                })?;
            let start_tick_index = page.start_tick_index();

            match page.find_next_initialized_tick(search_index, self.tick_spacing, self.a_to_b) {
                Ok(next_tick_index) => return Ok((array_index, next_tick_index)),
                Err(QuoteError::NotFound) => {}
                Err(err) => return Err(err),
            }

            if self.a_to_b && start_tick_index <= MIN_TICK_INDEX {
                return Ok((array_index, MIN_TICK_INDEX));
            }
            if !self.a_to_b && start_tick_index + ticks_in_array > MAX_TICK_INDEX {
                return Ok((array_index, MAX_TICK_INDEX));
            }

            if array_index + 1 == self.pages.len() {
                let edge = if self.a_to_b {
                    start_tick_index
                } else {
                    start_tick_index + ticks_in_array - 1
                };
                return Ok((array_index, edge));
            }

            // continue from the near edge of the next page
            search_index = if self.a_to_b {
                start_tick_index - 1
            } else {
                start_tick_index + ticks_in_array - 1
            };
            array_index += 1;
        }
    }

    /// Position of the page a swap resting at `tick_index` searches from.
    pub fn page_index(&self, tick_index: i32) -> Option<usize> {
        let ticks_in_array = ticks_in_array(self.tick_spacing).ok()?;
        let shift = if self.a_to_b { 0 } else { i32::from(self.tick_spacing) };
        let start_tick_index = tick_index
            .checked_add(shift)?
            .div_euclid(ticks_in_array)
            .checked_mul(ticks_in_array)?;
        self.pages
            .iter()
            .position(|page| page.start_tick_index() == start_tick_index)
    }

    /// Slot of `tick_index` within page `array_index`.
    pub fn tick_offset(&self, array_index: usize, tick_index: i32) -> Option<isize> {
        let page = self.pages.get(array_index)?;
        slot_offset(page.start_tick_index(), tick_index, self.tick_spacing)
    }

    /// The initialized tick at `tick_index` in page `array_index`, if any.
    /// Unaligned ticks (page edges and protocol bounds) carry no liquidity.
    pub fn initialized_tick(&self, array_index: usize, tick_index: i32) -> Option<&Tick> {
        match self.pages.get(array_index)? {
            TickArrayPage::Loaded(tick_array) => tick_array
                .tick(tick_index, self.tick_spacing)
                .ok()
                .filter(|tick| tick.initialized),
            TickArrayPage::Uninitialized { .. } => None,
        }
    }
}
