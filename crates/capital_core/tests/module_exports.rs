//! Integration tests for module exports.
//!
//! Verify that all public modules and types are correctly exported
//! and accessible via absolute paths.

use approx::assert_relative_eq;

/// Test that distribution functions are accessible via absolute path.
#[test]
fn test_distribution_module_exports() {
    use capital_core::math::distributions::{inverse_norm_cdf, norm_cdf, norm_pdf};
    use capital_core::math::{inverse_norm_cdf as inv, norm_cdf as cdf};

    assert_eq!(norm_cdf(0.0_f64), cdf(0.0_f64));
    assert_eq!(inverse_norm_cdf(0.3_f64), inv(0.3_f64));
    assert!(norm_pdf(0.0_f64) > 0.39);
}

/// Test that parameter functions are accessible via absolute path.
#[test]
fn test_params_module_exports() {
    use capital_core::params::correlation::asset_correlation;
    use capital_core::params::maturity::{maturity_adjustment, MaturityAdjustmentMethod};
    use capital_core::params::ttc::{derive_ttc_pd, TtcPdInputs};

    let r = asset_correlation(0.02);
    assert!(r > 0.12 && r < 0.24);

    let ma = maturity_adjustment(0.02, 3.0, MaturityAdjustmentMethod::Basel);
    assert!(ma > 1.0);

    let inputs = TtcPdInputs::with_defaults(0.02).unwrap();
    assert_relative_eq!(
        derive_ttc_pd(0.02).unwrap(),
        capital_core::params::derive_ttc_pd_from_inputs(&inputs)
    );
}

/// Test that error types are accessible via absolute path.
#[test]
fn test_types_module_exports() {
    use capital_core::types::error::ParameterError;

    let err = ParameterError::InvalidInput("x".to_string());
    assert!(err.to_string().contains("Invalid parameter"));
}

/// The regulatory inputs of the capital formula for a 1% PD obligor.
#[test]
fn test_formula_inputs_for_one_percent_pd() {
    use capital_core::math::{inverse_norm_cdf, norm_cdf};
    use capital_core::params::{asset_correlation, maturity_adjustment, MaturityAdjustmentMethod};

    let pd = 0.01_f64;
    let r = asset_correlation(pd);
    let g_pd = inverse_norm_cdf(pd);
    let g_999 = inverse_norm_cdf(0.999_f64);
    let conditional = norm_cdf(g_pd / (1.0 - r).sqrt() + (r / (1.0 - r)).sqrt() * g_999);

    assert_relative_eq!(r, 0.1928, epsilon = 1e-4);
    assert_relative_eq!(g_pd, -2.326_348, epsilon = 1e-6);
    assert_relative_eq!(g_999, 3.090_232, epsilon = 1e-6);
    assert_relative_eq!(conditional, 0.1403, epsilon = 1e-3);

    let ma = maturity_adjustment(pd, 2.5, MaturityAdjustmentMethod::Basel);
    assert_relative_eq!(ma, 1.2598, epsilon = 1e-3);
}
