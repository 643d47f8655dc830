//! Wraparound-safe subtraction for fixed-width kernel counters.

use crate::{
    error::{CoreError, Result},
    model::CounterWidth,
};

/// Counter width shared by every wrap-sensitive counter of one collector.
///
/// Starts undetermined; `set_width` is called by each baseline. Subtracting
/// before that is a precondition violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterWidthPolicy {
    width: Option<CounterWidth>,
}

impl CounterWidthPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(width: CounterWidth) -> Self {
        Self { width: Some(width) }
    }

    pub fn set_width(&mut self, is_64_bit: bool) {
        self.width = Some(CounterWidth::from_64_bit(is_64_bit));
    }

    pub fn width(&self) -> Option<CounterWidth> {
        self.width
    }

    pub fn current_modulus(&self) -> Result<u128> {
        self.width
            .map(CounterWidth::modulus)
            .ok_or_else(|| CoreError::precondition("counter width has not been established"))
    }

    /// `(modulus + current - previous) mod modulus`.
    ///
    /// Recovers the true increase across at most one wrap. Inputs wider than
    /// the modulus are reduced first, so a 32-bit policy over 64-bit values
    /// still yields the low 32 bits of the difference.
    pub fn sub_with_wrap(&self, current: u64, previous: u64) -> Result<u64> {
        let modulus = self.current_modulus()?;
        let current = u128::from(current) % modulus;
        let previous = u128::from(previous) % modulus;
        // result < modulus <= 2^64
        Ok(((modulus + current - previous) % modulus) as u64)
    }
}
