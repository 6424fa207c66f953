//! Counterparty records with the inputs of the IRB capital formula.
//!
//! A [`Counterparty`] is owned by the caller. Capital calculations read it
//! and never change it; overlays live in a separate
//! [`AdjustmentBook`](crate::adjustment::AdjustmentBook).

use capital_core::types::ParameterError;

use super::error::PortfolioError;
use super::ids::CounterpartyId;
use super::rating::CreditRating;

/// Classification flags relevant to the asset value correlation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InstitutionFlags {
    /// Financial institution (bank, insurer, broker).
    pub is_financial: bool,
    /// Large financial institution (total assets above the regulatory threshold).
    pub is_large_financial: bool,
    /// Subject to prudential regulation.
    pub is_regulated: bool,
}

impl InstitutionFlags {
    /// Whether the 1.25 correlation multiplier applies.
    ///
    /// Covers large financial institutions and unregulated financial entities.
    #[inline]
    pub fn attracts_correlation_multiplier(&self) -> bool {
        self.is_large_financial || (self.is_financial && !self.is_regulated)
    }
}

/// Credit counterparty with PD, LGD, EAD and effective maturity.
///
/// # Examples
///
/// ```
/// use capital_risk::portfolio::{Counterparty, CounterpartyId, CreditRating};
///
/// let cp = Counterparty::new(CounterpartyId::new("CP001"), 0.01, 0.45, 10_000_000.0, 2.5)
///     .unwrap()
///     .with_name("Acme Corp")
///     .with_industry("Manufacturing")
///     .with_credit_rating(CreditRating::BBB);
///
/// assert_eq!(cp.id().as_str(), "CP001");
/// assert_eq!(cp.name(), "Acme Corp");
/// assert_eq!(cp.credit_rating(), Some(CreditRating::BBB));
/// assert!(!cp.use_credit_rating_pd());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counterparty {
    id: CounterpartyId,
    #[cfg_attr(feature = "serde", serde(default))]
    name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    industry: String,
    #[cfg_attr(feature = "serde", serde(default))]
    region: String,
    /// Point-in-time PD
    pd: f64,
    /// Through-the-cycle PD; derived from the PIT PD when absent
    #[cfg_attr(feature = "serde", serde(default))]
    ttc_pd: Option<f64>,
    lgd: f64,
    ead: f64,
    /// Effective maturity in years
    maturity: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    flags: InstitutionFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    credit_rating: Option<CreditRating>,
    #[cfg_attr(feature = "serde", serde(default))]
    use_credit_rating_pd: bool,
}

impl Counterparty {
    /// Creates a new counterparty.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique counterparty identifier
    /// * `pd` - Point-in-time probability of default in `[0, 1]`
    /// * `lgd` - Loss given default in `[0, 1]`
    /// * `ead` - Exposure at default, non-negative
    /// * `maturity` - Effective maturity in years, non-negative
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::InvalidCounterparty` when any value is
    /// non-finite or out of range.
    pub fn new(
        id: CounterpartyId,
        pd: f64,
        lgd: f64,
        ead: f64,
        maturity: f64,
    ) -> Result<Self, PortfolioError> {
        let check = |value: Result<f64, ParameterError>| value.map_err(|e| invalid(&id, e));
        let pd = check(ParameterError::check_unit_interval("pd", pd))?;
        let lgd = check(ParameterError::check_unit_interval("lgd", lgd))?;
        let ead = check(ParameterError::check_non_negative("ead", ead))?;
        let maturity = check(ParameterError::check_non_negative("maturity", maturity))?;

        Ok(Self {
            id,
            name: String::new(),
            industry: String::new(),
            region: String::new(),
            pd,
            ttc_pd: None,
            lgd,
            ead,
            maturity,
            flags: InstitutionFlags::default(),
            credit_rating: None,
            use_credit_rating_pd: false,
        })
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the industry used for segmentation and TTC profiles.
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = industry.into();
        self
    }

    /// Sets the region used for segmentation.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the institution classification flags.
    pub fn with_flags(mut self, flags: InstitutionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attaches an external credit rating.
    pub fn with_credit_rating(mut self, rating: CreditRating) -> Self {
        self.credit_rating = Some(rating);
        self
    }

    /// Selects whether the rating's indicative PD replaces the PD inputs.
    pub fn with_rating_pd(mut self, use_rating_pd: bool) -> Self {
        self.use_credit_rating_pd = use_rating_pd;
        self
    }

    /// Sets an explicit through-the-cycle PD.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::InvalidCounterparty` if `ttc_pd` is not in `[0, 1]`.
    pub fn with_ttc_pd(mut self, ttc_pd: f64) -> Result<Self, PortfolioError> {
        self.ttc_pd = Some(
            ParameterError::check_unit_interval("ttc_pd", ttc_pd).map_err(|e| invalid(&self.id, e))?,
        );
        Ok(self)
    }

    /// Returns a copy with a different exposure at default.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::InvalidCounterparty` if `ead` is negative or non-finite.
    pub fn with_ead(mut self, ead: f64) -> Result<Self, PortfolioError> {
        self.ead =
            ParameterError::check_non_negative("ead", ead).map_err(|e| invalid(&self.id, e))?;
        Ok(self)
    }

    /// Returns the counterparty ID.
    #[inline]
    pub fn id(&self) -> &CounterpartyId {
        &self.id
    }

    /// Returns the display name (empty when unset).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the industry (empty when unset).
    #[inline]
    pub fn industry(&self) -> &str {
        &self.industry
    }

    /// Returns the region (empty when unset).
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the point-in-time PD.
    #[inline]
    pub fn pd(&self) -> f64 {
        self.pd
    }

    /// Returns the explicit TTC PD, if one was supplied.
    #[inline]
    pub fn ttc_pd(&self) -> Option<f64> {
        self.ttc_pd
    }

    /// Returns the loss given default.
    #[inline]
    pub fn lgd(&self) -> f64 {
        self.lgd
    }

    /// Returns the exposure at default.
    #[inline]
    pub fn ead(&self) -> f64 {
        self.ead
    }

    /// Returns the effective maturity in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Returns the classification flags.
    #[inline]
    pub fn flags(&self) -> InstitutionFlags {
        self.flags
    }

    /// Returns the credit rating if set.
    #[inline]
    pub fn credit_rating(&self) -> Option<CreditRating> {
        self.credit_rating
    }

    /// Whether the rating PD should be used instead of the PD inputs.
    #[inline]
    pub fn use_credit_rating_pd(&self) -> bool {
        self.use_credit_rating_pd
    }

    /// Returns the rating PD when it is selected and a rating is present.
    #[inline]
    pub fn rating_pd(&self) -> Option<f64> {
        if self.use_credit_rating_pd {
            self.credit_rating.map(|r| r.indicative_pd())
        } else {
            None
        }
    }
}

fn invalid(id: &CounterpartyId, err: ParameterError) -> PortfolioError {
    PortfolioError::InvalidCounterparty(id.to_string(), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Counterparty {
        Counterparty::new(CounterpartyId::new("CP001"), 0.02, 0.45, 1_000_000.0, 3.0).unwrap()
    }

    #[test]
    fn test_new_stores_inputs() {
        let cp = sample();
        assert_eq!(cp.pd(), 0.02);
        assert_eq!(cp.lgd(), 0.45);
        assert_eq!(cp.ead(), 1_000_000.0);
        assert_eq!(cp.maturity(), 3.0);
        assert_eq!(cp.ttc_pd(), None);
        assert_eq!(cp.name(), "");
        assert_eq!(cp.flags(), InstitutionFlags::default());
    }

    #[test]
    fn test_new_rejects_out_of_range_inputs() {
        let id = CounterpartyId::new("BAD");
        assert!(Counterparty::new(id.clone(), 1.5, 0.45, 1.0, 1.0).is_err());
        assert!(Counterparty::new(id.clone(), 0.01, -0.1, 1.0, 1.0).is_err());
        assert!(Counterparty::new(id.clone(), 0.01, 0.45, -1.0, 1.0).is_err());
        assert!(Counterparty::new(id.clone(), 0.01, 0.45, 1.0, f64::NAN).is_err());

        let err = Counterparty::new(id, 0.01, 1.2, 1.0, 1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid counterparty BAD: lgd must be a finite value in [0, 1], got 1.2"
        );
    }

    #[test]
    fn test_rating_pd_requires_flag_and_rating() {
        let cp = sample().with_credit_rating(CreditRating::BB);
        assert_eq!(cp.rating_pd(), None);

        let cp = cp.with_rating_pd(true);
        assert_eq!(cp.rating_pd(), Some(0.01));

        let unrated = sample().with_rating_pd(true);
        assert_eq!(unrated.rating_pd(), None);
    }

    #[test]
    fn test_with_ttc_pd_validates() {
        assert_eq!(sample().with_ttc_pd(0.015).unwrap().ttc_pd(), Some(0.015));
        assert!(sample().with_ttc_pd(-0.01).is_err());
    }

    #[test]
    fn test_with_ead_keeps_other_fields() {
        let cp = sample().with_name("Acme").with_ead(500_000.0).unwrap();
        assert_eq!(cp.ead(), 500_000.0);
        assert_eq!(cp.name(), "Acme");
        assert_eq!(cp.pd(), 0.02);
        assert!(sample().with_ead(f64::INFINITY).is_err());
    }

    #[test]
    fn test_correlation_multiplier_flags() {
        let bank = InstitutionFlags {
            is_financial: true,
            is_large_financial: false,
            is_regulated: true,
        };
        assert!(!bank.attracts_correlation_multiplier());

        let shadow_bank = InstitutionFlags {
            is_regulated: false,
            ..bank
        };
        assert!(shadow_bank.attracts_correlation_multiplier());

        let large = InstitutionFlags {
            is_large_financial: true,
            ..bank
        };
        assert!(large.attracts_correlation_multiplier());
        assert!(!InstitutionFlags::default().attracts_correlation_multiplier());
    }
}
