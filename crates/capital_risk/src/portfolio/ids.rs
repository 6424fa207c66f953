//! Identifier type for counterparties.
//!
//! Counterparty ids are opaque strings supplied by the caller. The newtype
//! keeps them from being confused with names, industries or regions.

use std::fmt;

/// Unique identifier for a counterparty.
///
/// # Examples
///
/// ```
/// use capital_risk::portfolio::CounterpartyId;
///
/// let id = CounterpartyId::new("CP001");
/// assert_eq!(id.as_str(), "CP001");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterpartyId(String);

impl CounterpartyId {
    /// Creates a new counterparty ID.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CounterpartyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CounterpartyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_display_matches_inner_string() {
        let id = CounterpartyId::from("ACME-01");
        assert_eq!(id.to_string(), "ACME-01");
        assert_eq!(id, CounterpartyId::new(String::from("ACME-01")));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let ids: BTreeSet<CounterpartyId> = ["CP10", "CP02", "CP01"]
            .into_iter()
            .map(CounterpartyId::from)
            .collect();
        let ordered: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(ordered, vec!["CP01", "CP02", "CP10"]);
    }
}
