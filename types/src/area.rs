//! Land area in hectares.
//!
//! Declared areas carry two decimal places, so they are stored as an integer
//! count of hundredths of a hectare. Computations that need real arithmetic
//! (tolerance checks, geodesic comparison) go through [`Hectares::as_f64`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ShambaError;

/// A non-negative area with hundredth-of-a-hectare precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hectares(u64);

impl Hectares {
    pub const ZERO: Self = Self(0);

    /// Construct from hundredths of a hectare.
    pub fn from_centi(centi: u64) -> Self {
        Self(centi)
    }

    /// Construct from a floating-point value, rounding to two decimals.
    pub fn from_f64(ha: f64) -> Result<Self, ShambaError> {
        if !ha.is_finite() || ha < 0.0 {
            return Err(ShambaError::InvalidArea(ha.to_string()));
        }
        let centi = (ha * 100.0).round();
        if centi > u64::MAX as f64 {
            return Err(ShambaError::InvalidArea(ha.to_string()));
        }
        Ok(Self(centi as u64))
    }

    pub fn centi(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Hectares {
    type Err = ShambaError;

    /// Parses `"12"`, `"12.5"` or `"12.50"`. More than two decimals, signs and
    /// exponents are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s)
            .map(Self)
            .ok_or_else(|| ShambaError::InvalidArea(s.to_string()))
    }
}

/// Parse an unsigned decimal with at most two fractional digits into
/// hundredths.
pub(crate) fn parse_hundredths(s: &str) -> Option<u64> {
    let raw = s.trim();
    let (whole, frac) = raw.split_once('.').unwrap_or((raw, ""));
    if whole.is_empty() || frac.len() > 2 {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: u64 = whole.parse().ok()?;
    let frac: u64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac)
}

impl fmt::Display for Hectares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
