//! Two-level RWA overlays.
//!
//! Every counterparty can carry at most one counterparty-level and one
//! portfolio-level [`Adjustment`]. They are stored in an [`AdjustmentBook`]
//! next to, not inside, the counterparty records and are combined with the
//! formula RWA at read time in a fixed order:
//!
//! ```text
//! baseline = counterparty_level(original_rwa)
//! rwa      = portfolio_level(baseline)
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use crate::portfolio::CounterpartyId;

/// A single RWA overlay.
///
/// # Examples
///
/// ```
/// use capital_risk::adjustment::Adjustment;
///
/// assert_eq!(Adjustment::multiplicative(1.5).apply(100.0), 150.0);
/// assert_eq!(Adjustment::additive(-20.0).apply(100.0), 80.0);
/// assert_eq!(Adjustment::None.apply(100.0), 100.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Adjustment {
    /// No overlay.
    #[default]
    None,
    /// Scales RWA by `multiplier`.
    Multiplicative {
        /// Factor applied to RWA
        multiplier: f64,
    },
    /// Adds `amount` to RWA.
    Additive {
        /// Amount added to RWA (negative to reduce)
        amount: f64,
    },
}

impl Adjustment {
    /// Creates a multiplicative overlay.
    #[inline]
    pub fn multiplicative(multiplier: f64) -> Self {
        Adjustment::Multiplicative { multiplier }
    }

    /// Creates an additive overlay.
    #[inline]
    pub fn additive(amount: f64) -> Self {
        Adjustment::Additive { amount }
    }

    /// Applies the overlay to an RWA amount.
    #[inline]
    pub fn apply(&self, rwa: f64) -> f64 {
        match *self {
            Adjustment::None => rwa,
            Adjustment::Multiplicative { multiplier } => rwa * multiplier,
            Adjustment::Additive { amount } => rwa + amount,
        }
    }

    /// Whether this is the empty overlay.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Adjustment::None)
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::None => f.write_str("-"),
            Adjustment::Multiplicative { multiplier } => write!(f, "x{}", multiplier),
            Adjustment::Additive { amount } => write!(f, "{:+}", amount),
        }
    }
}

/// Level at which an overlay is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AdjustmentLevel {
    /// Analyst overlay on a single counterparty; applied first.
    Counterparty,
    /// Share of a portfolio-level adjustment; applied second.
    Portfolio,
}

/// The pair of overlays attached to one counterparty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CounterpartyOverlays {
    /// Counterparty-level overlay
    pub counterparty: Adjustment,
    /// Portfolio-level overlay
    pub portfolio: Adjustment,
}

impl CounterpartyOverlays {
    /// Overlays with both levels empty.
    pub const NONE: CounterpartyOverlays = CounterpartyOverlays {
        counterparty: Adjustment::None,
        portfolio: Adjustment::None,
    };

    /// RWA after the counterparty level, before the portfolio level.
    #[inline]
    pub fn baseline(&self, original_rwa: f64) -> f64 {
        self.counterparty.apply(original_rwa)
    }

    /// RWA after both levels.
    #[inline]
    pub fn apply(&self, original_rwa: f64) -> f64 {
        self.portfolio.apply(self.baseline(original_rwa))
    }

    /// Returns the overlay at `level`.
    #[inline]
    pub fn get(&self, level: AdjustmentLevel) -> Adjustment {
        match level {
            AdjustmentLevel::Counterparty => self.counterparty,
            AdjustmentLevel::Portfolio => self.portfolio,
        }
    }

    /// Whether neither level carries an overlay.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counterparty.is_none() && self.portfolio.is_none()
    }

    fn slot_mut(&mut self, level: AdjustmentLevel) -> &mut Adjustment {
        match level {
            AdjustmentLevel::Counterparty => &mut self.counterparty,
            AdjustmentLevel::Portfolio => &mut self.portfolio,
        }
    }
}

/// Overlays for a set of counterparties, keyed by ID.
///
/// Counterparties without an entry have no overlays. Setting both levels to
/// [`Adjustment::None`] removes the entry.
///
/// # Examples
///
/// ```
/// use capital_risk::adjustment::{Adjustment, AdjustmentBook, AdjustmentLevel};
/// use capital_risk::portfolio::CounterpartyId;
///
/// let id = CounterpartyId::new("CP001");
/// let mut book = AdjustmentBook::new();
/// book.set(id.clone(), AdjustmentLevel::Counterparty, Adjustment::multiplicative(1.1));
/// book.set(id.clone(), AdjustmentLevel::Portfolio, Adjustment::additive(50_000.0));
///
/// let rwa = book.overlays(&id).apply(1_000_000.0);
/// assert!((rwa - 1_150_000.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AdjustmentBook {
    entries: BTreeMap<CounterpartyId, CounterpartyOverlays>,
}

impl AdjustmentBook {
    /// Creates an empty book.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the overlays for `id`, empty when none are recorded.
    #[inline]
    pub fn overlays(&self, id: &CounterpartyId) -> CounterpartyOverlays {
        self.entries.get(id).copied().unwrap_or_default()
    }

    /// Returns the overlay for `id` at `level`.
    #[inline]
    pub fn get(&self, id: &CounterpartyId, level: AdjustmentLevel) -> Adjustment {
        self.overlays(id).get(level)
    }

    /// Replaces the overlay for `id` at `level`.
    pub fn set(&mut self, id: CounterpartyId, level: AdjustmentLevel, adjustment: Adjustment) {
        match self.entries.entry(id) {
            Entry::Occupied(mut occupied) => {
                *occupied.get_mut().slot_mut(level) = adjustment;
                if occupied.get().is_empty() {
                    occupied.remove();
                }
            }
            Entry::Vacant(vacant) => {
                if !adjustment.is_none() {
                    *vacant.insert(CounterpartyOverlays::default()).slot_mut(level) = adjustment;
                }
            }
        }
    }

    /// Removes the overlay for `id` at `level`.
    #[inline]
    pub fn clear(&mut self, id: &CounterpartyId, level: AdjustmentLevel) {
        self.set(id.clone(), level, Adjustment::None);
    }

    /// Removes every overlay at `level`.
    pub fn clear_level(&mut self, level: AdjustmentLevel) {
        for overlays in self.entries.values_mut() {
            *overlays.slot_mut(level) = Adjustment::None;
        }
        self.entries.retain(|_, overlays| !overlays.is_empty());
    }

    /// Number of counterparties with at least one overlay.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no overlays are recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over recorded overlays in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&CounterpartyId, &CounterpartyOverlays)> {
        self.entries.iter()
    }
}
