//! Input sampling seam.
//!
//! Polling real input devices belongs to the host; movement only needs a
//! value per named axis.

use std::collections::HashMap;

/// Supplies the current value of a named input axis.
pub trait InputSource: Send {
    /// Current value of `axis`, `0.0` if unknown.
    fn axis(&self, axis: &str) -> f32;
}

/// An [`InputSource`] backed by a map the host writes into.
#[derive(Debug, Default, Clone)]
pub struct AxisTable {
    values: HashMap<String, f32>,
}

impl AxisTable {
    /// Create an empty table; every axis reads `0.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of `axis`.
    pub fn set(&mut self, axis: impl Into<String>, value: f32) {
        self.values.insert(axis.into(), value);
    }

    /// Builder form of [`AxisTable::set`].
    #[must_use]
    pub fn with(mut self, axis: impl Into<String>, value: f32) -> Self {
        self.set(axis, value);
        self
    }
}

impl InputSource for AxisTable {
    fn axis(&self, axis: &str) -> f32 {
        self.values.get(axis).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_axis_reads_zero() {
        let table = AxisTable::new().with("Vertical1", 1.0);
        assert_eq!(table.axis("Vertical1"), 1.0);
        assert_eq!(table.axis("Horizontal1"), 0.0);
    }
}
