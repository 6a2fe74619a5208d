//! Ledger currency amounts.
//!
//! Amounts are represented as fixed-point integers to avoid floating-point
//! errors. One HBAR is 100,000,000 tinybars.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Native ledger currency in its smallest unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tinybars(u64);

impl Tinybars {
    pub const ZERO: Self = Self(0);

    /// Tinybars per whole HBAR.
    pub const PER_HBAR: u64 = 100_000_000;

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn from_hbar(hbar: u64) -> Self {
        Self(hbar.saturating_mul(Self::PER_HBAR))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl Add for Tinybars {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Tinybars {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Tinybars {
    /// Renders as HBAR with eight decimal places, e.g. `1.00000000 ℏ`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:08} ℏ",
            self.0 / Self::PER_HBAR,
            self.0 % Self::PER_HBAR
        )
    }
}
