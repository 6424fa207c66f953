//! External credit ratings and their indicative default probabilities.

use std::fmt;
use std::str::FromStr;

use super::error::PortfolioError;

/// Credit rating on the usual agency scale.
///
/// Ratings range from AAA (highest quality) to D (default).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreditRating {
    /// Highest quality (prime)
    AAA,
    /// High quality
    AA,
    /// Upper medium grade
    A,
    /// Lower medium grade (investment grade threshold)
    BBB,
    /// Non-investment grade speculative
    BB,
    /// Highly speculative
    B,
    /// Substantial risks
    CCC,
    /// Extremely speculative
    CC,
    /// In default with little prospect for recovery
    C,
    /// In default
    D,
}

impl CreditRating {
    /// All ratings from best to worst.
    pub const ALL: [CreditRating; 10] = [
        CreditRating::AAA,
        CreditRating::AA,
        CreditRating::A,
        CreditRating::BBB,
        CreditRating::BB,
        CreditRating::B,
        CreditRating::CCC,
        CreditRating::CC,
        CreditRating::C,
        CreditRating::D,
    ];

    /// Returns whether this rating is investment grade (BBB or better).
    #[inline]
    pub fn is_investment_grade(&self) -> bool {
        matches!(
            self,
            CreditRating::AAA | CreditRating::AA | CreditRating::A | CreditRating::BBB
        )
    }

    /// Returns a one-year PD for this rating (indicative only).
    ///
    /// The investment-grade end sits at the 3 bp regulatory PD floor.
    /// Replace with the bank's own master scale in production.
    pub fn indicative_pd(&self) -> f64 {
        match self {
            CreditRating::AAA => 0.0003,
            CreditRating::AA => 0.0005,
            CreditRating::A => 0.001,
            CreditRating::BBB => 0.0025,
            CreditRating::BB => 0.01,
            CreditRating::B => 0.035,
            CreditRating::CCC => 0.15,
            CreditRating::CC => 0.25,
            CreditRating::C => 0.40,
            CreditRating::D => 1.0,
        }
    }

    /// Returns the rating symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            CreditRating::AAA => "AAA",
            CreditRating::AA => "AA",
            CreditRating::A => "A",
            CreditRating::BBB => "BBB",
            CreditRating::BB => "BB",
            CreditRating::B => "B",
            CreditRating::CCC => "CCC",
            CreditRating::CC => "CC",
            CreditRating::C => "C",
            CreditRating::D => "D",
        }
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CreditRating {
    type Err = PortfolioError;

    /// Parses a rating symbol. Outlook modifiers (`+`/`-`) are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim().trim_end_matches(['+', '-']).to_uppercase();
        CreditRating::ALL
            .into_iter()
            .find(|rating| rating.symbol() == symbol)
            .ok_or_else(|| PortfolioError::UnknownRating(s.to_string()))
    }
}
