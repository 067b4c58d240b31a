//! Capability kinds and bitmask codes.
//!
//! Every component type is a [`CapabilityKind`]. The first time a kind is
//! referenced by a [`CapabilityTable`] it claims the next unused bit, and
//! that bit is its [`CapabilityCode`] for the rest of the table's life. An
//! entity's aggregate code is the OR of the codes of its components, so a
//! capability test is a single mask comparison.

use std::collections::HashMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// The closed set of component types known to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CapabilityKind {
    /// Position, orientation, and input-driven motion.
    Movement,
    /// A rendered (and optionally physically simulated) actor instance.
    Actor,
}

impl CapabilityKind {
    /// Every capability kind.
    pub const ALL: [CapabilityKind; 2] = [CapabilityKind::Movement, CapabilityKind::Actor];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CapabilityKind::Movement => "Movement",
            CapabilityKind::Actor => "Actor",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A capability bitmask.
///
/// A code handed out by [`CapabilityTable::claim`] has exactly one bit set.
/// Aggregate codes (entity codes) are unions of such single-bit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CapabilityCode(pub u32);

impl CapabilityCode {
    /// The code with no capabilities.
    pub const EMPTY: CapabilityCode = CapabilityCode(0);

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `capability` is set in `self`.
    ///
    /// The empty code is never contained, so probing with an unassigned
    /// capability always fails.
    #[must_use]
    pub const fn contains(self, capability: CapabilityCode) -> bool {
        capability.0 != 0 && self.0 & capability.0 == capability.0
    }

    /// Returns `self` with the bits of `capability` cleared.
    #[must_use]
    pub const fn without(self, capability: CapabilityCode) -> Self {
        Self(self.0 & !capability.0)
    }

    /// Number of capabilities in this code.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl BitOr for CapabilityCode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CapabilityCode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CapabilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b}", self.0)
    }
}

/// Assigns capability bits on first reference.
///
/// Claiming is idempotent per kind and deterministic within a single run:
/// the order of first references decides the bit order.
#[derive(Debug, Default, Clone)]
pub struct CapabilityTable {
    codes: HashMap<CapabilityKind, CapabilityCode>,
    next_bit: u32,
}

impl CapabilityTable {
    /// Create an empty table with no bits claimed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `kind`, claiming the next unused bit if the kind
    /// has never been referenced.
    pub fn claim(&mut self, kind: CapabilityKind) -> CapabilityCode {
        if let Some(&code) = self.codes.get(&kind) {
            return code;
        }
        debug_assert!(self.next_bit < u32::BITS, "capability bits exhausted");
        let code = CapabilityCode(1 << self.next_bit);
        self.next_bit += 1;
        self.codes.insert(kind, code);
        tracing::debug!(%kind, %code, "claimed capability bit");
        code
    }

    /// Returns the code for `kind` without claiming.
    #[must_use]
    pub fn lookup(&self, kind: CapabilityKind) -> Option<CapabilityCode> {
        self.codes.get(&kind).copied()
    }

    /// Returns the kind owning a single-bit `code`.
    #[must_use]
    pub fn kind_of(&self, code: CapabilityCode) -> Option<CapabilityKind> {
        self.codes
            .iter()
            .find(|&(_, &c)| c == code)
            .map(|(&kind, _)| kind)
    }

    /// Expand an aggregate code into the kinds it contains.
    #[must_use]
    pub fn kinds_in(&self, code: CapabilityCode) -> Vec<CapabilityKind> {
        CapabilityKind::ALL
            .into_iter()
            .filter(|&kind| self.lookup(kind).is_some_and(|c| code.contains(c)))
            .collect()
    }

    /// Number of kinds that have claimed a bit.
    #[must_use]
    pub fn claimed(&self) -> usize {
        self.codes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_assigns_distinct_single_bits() {
        let mut table = CapabilityTable::new();
        let a = table.claim(CapabilityKind::Actor);
        let m = table.claim(CapabilityKind::Movement);
        assert_eq!(a.count(), 1);
        assert_eq!(m.count(), 1);
        assert_ne!(a, m);
        assert_eq!(a.bits() & m.bits(), 0);
    }

    #[test]
    fn test_claim_is_idempotent() {
        let mut table = CapabilityTable::new();
        let first = table.claim(CapabilityKind::Movement);
        let second = table.claim(CapabilityKind::Movement);
        assert_eq!(first, second);
        assert_eq!(table.claimed(), 1);
    }

    #[test]
    fn test_first_reference_order_decides_bits() {
        let mut table = CapabilityTable::new();
        assert_eq!(table.claim(CapabilityKind::Actor), CapabilityCode(0b01));
        assert_eq!(table.claim(CapabilityKind::Movement), CapabilityCode(0b10));
    }

    #[test]
    fn test_lookup_does_not_claim() {
        let table = CapabilityTable::new();
        assert_eq!(table.lookup(CapabilityKind::Actor), None);
        assert_eq!(table.claimed(), 0);
    }

    #[test]
    fn test_contains_rejects_empty_code() {
        let code = CapabilityCode(0b11);
        assert!(code.contains(CapabilityCode(0b01)));
        assert!(!code.contains(CapabilityCode::EMPTY));
        assert!(!CapabilityCode::EMPTY.contains(CapabilityCode(0b01)));
    }

    #[test]
    fn test_kinds_in_and_kind_of() {
        let mut table = CapabilityTable::new();
        let m = table.claim(CapabilityKind::Movement);
        let a = table.claim(CapabilityKind::Actor);
        assert_eq!(table.kind_of(a), Some(CapabilityKind::Actor));
        assert_eq!(
            table.kinds_in(m | a),
            vec![CapabilityKind::Movement, CapabilityKind::Actor]
        );
        assert_eq!(table.kinds_in((m | a).without(m)), vec![CapabilityKind::Actor]);
    }
}
