use super::tables::{UK_2024_25, tax_across_bands};
use super::types::{DeductionResult, TaxYear};

pub fn compute_deductions(gross_salary: f64, pension_rate_percent: f64) -> DeductionResult {
    compute_deductions_for_year(&UK_2024_25, gross_salary, pension_rate_percent)
}

// Pension comes off before tax; insurance is charged on the full gross salary.
pub fn compute_deductions_for_year(
    tax_year: &TaxYear,
    gross_salary: f64,
    pension_rate_percent: f64,
) -> DeductionResult {
    let pension_amount = gross_salary * pension_rate_percent / 100.0;
    let taxable_amount = gross_salary - pension_amount;

    let tax = income_tax(tax_year, taxable_amount);
    let insurance_contribution = tax_across_bands(&tax_year.insurance_bands, gross_salary);

    DeductionResult {
        gross_salary,
        taxable_amount,
        tax,
        insurance_contribution,
        pension_amount,
        take_home_pay: gross_salary - tax - insurance_contribution - pension_amount,
    }
}

fn income_tax(tax_year: &TaxYear, taxable_amount: f64) -> f64 {
    let allowance = personal_allowance(tax_year, taxable_amount);
    let above_allowance = taxable_amount - allowance;
    let above_allowance = if above_allowance < 0.0 { 0.0 } else { above_allowance };
    tax_across_bands(&tax_year.income_tax_bands, above_allowance)
}

fn personal_allowance(tax_year: &TaxYear, taxable_amount: f64) -> f64 {
    let allowance = tax_year.personal_allowance;
    match tax_year.allowance_taper {
        Some(taper) if taxable_amount > taper.start => {
            let reduction = (taxable_amount - taper.start) * taper.withdrawal_rate;
            (allowance - reduction).max(0.0)
        }
        _ => allowance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AllowanceTaper;
    use proptest::prelude::{prop_assert, prop_assume, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_conserves_gross(result: &DeductionResult) {
        let sum = result.tax
            + result.insurance_contribution
            + result.pension_amount
            + result.take_home_pay;
        let tolerance = EPS * result.gross_salary.abs().max(1.0);
        assert!(
            (sum - result.gross_salary).abs() <= tolerance,
            "deductions {sum} do not add back to gross {}",
            result.gross_salary
        );
    }

    #[test]
    fn fifty_thousand_without_pension_stays_in_basic_band() {
        let result = compute_deductions(50_000.0, 0.0);
        assert_approx(result.taxable_amount, 50_000.0);
        assert_approx(result.pension_amount, 0.0);
        assert_approx(result.tax, (50_000.0 - 12_570.0) * 0.20);
        assert_approx(result.tax, 7_486.0);
        assert_approx(result.insurance_contribution, (50_000.0 - 12_570.0) * 0.08);
        assert_approx(result.take_home_pay, 50_000.0 - 7_486.0 - 2_994.4);
        assert_conserves_gross(&result);
    }

    #[test]
    fn zero_salary_yields_all_zero_amounts() {
        let result = compute_deductions(0.0, 5.0);
        assert_eq!(result.tax, 0.0);
        assert_eq!(result.insurance_contribution, 0.0);
        assert_eq!(result.pension_amount, 0.0);
        assert_eq!(result.take_home_pay, 0.0);
    }

    #[test]
    fn sixty_thousand_matches_hand_calculation() {
        // 37 700 @ 20% + 9 730 @ 40%
        let result = compute_deductions(60_000.0, 0.0);
        assert_approx(result.tax, 11_432.0);
        // 37 700 @ 8% + 9 730 @ 2%
        assert_approx(result.insurance_contribution, 3_016.0 + 194.6);
    }

    #[test]
    fn additional_rate_applies_above_upper_threshold() {
        let result = compute_deductions(150_000.0, 0.0);
        let expected = 37_700.0 * 0.20 + 74_870.0 * 0.40 + (150_000.0 - 125_140.0) * 0.45;
        assert_approx(result.tax, expected);
        assert_conserves_gross(&result);
    }

    #[test]
    fn pension_reduces_tax_but_not_insurance() {
        let without = compute_deductions(60_000.0, 0.0);
        let with = compute_deductions(60_000.0, 10.0);
        assert_approx(with.pension_amount, 6_000.0);
        assert_approx(with.taxable_amount, 54_000.0);
        assert_approx(with.tax, 37_700.0 * 0.20 + 3_730.0 * 0.40);
        assert_approx(with.insurance_contribution, without.insurance_contribution);
        assert!(with.tax < without.tax);
    }

    #[test]
    fn taxable_income_on_basic_rate_seam_pays_no_higher_rate() {
        let result = compute_deductions(50_270.0, 0.0);
        assert_approx(result.tax, 37_700.0 * 0.20);
        assert_approx(result.insurance_contribution, 37_700.0 * 0.08);
    }

    #[test]
    fn salary_below_allowance_pays_no_tax_or_insurance() {
        let result = compute_deductions(12_000.0, 0.0);
        assert_approx(result.tax, 0.0);
        assert_approx(result.insurance_contribution, 0.0);
        assert_approx(result.take_home_pay, 12_000.0);
    }

    #[test]
    fn out_of_range_rates_are_computed_not_rejected() {
        let over = compute_deductions(40_000.0, 150.0);
        assert_approx(over.pension_amount, 60_000.0);
        assert_approx(over.tax, 0.0);
        assert_conserves_gross(&over);

        let negative = compute_deductions(40_000.0, -10.0);
        assert_approx(negative.pension_amount, -4_000.0);
        assert_approx(negative.taxable_amount, 44_000.0);
        assert_conserves_gross(&negative);
    }

    #[test]
    fn nan_salary_propagates_to_every_amount() {
        let result = compute_deductions(f64::NAN, 5.0);
        assert!(result.pension_amount.is_nan());
        assert!(result.tax.is_nan());
        assert!(result.insurance_contribution.is_nan());
        assert!(result.take_home_pay.is_nan());
    }

    #[test]
    fn nan_pension_rate_propagates_to_tax_and_take_home() {
        let result = compute_deductions(60_000.0, f64::NAN);
        assert!(result.pension_amount.is_nan());
        assert!(result.taxable_amount.is_nan());
        assert!(result.tax.is_nan());
        assert!(result.take_home_pay.is_nan());
        // Insurance reads gross salary only.
        assert_approx(result.insurance_contribution, 3_016.0 + 194.6);
    }

    #[test]
    fn allowance_taper_withdraws_allowance_above_start() {
        let mut tax_year = UK_2024_25;
        tax_year.allowance_taper = Some(AllowanceTaper {
            start: 100_000.0,
            withdrawal_rate: 0.5,
        });
        assert_approx(personal_allowance(&tax_year, 100_000.0), 12_570.0);
        assert_approx(personal_allowance(&tax_year, 110_000.0), 7_570.0);
        assert_approx(personal_allowance(&tax_year, 130_000.0), 0.0);

        let tapered = compute_deductions_for_year(&tax_year, 110_000.0, 0.0);
        let flat = compute_deductions(110_000.0, 0.0);
        assert!(tapered.tax > flat.tax);
        assert_conserves_gross(&tapered);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_deductions_add_back_to_gross(
            gross in 0u32..1_000_000,
            pension_rate in 0u32..=100
        ) {
            let result = compute_deductions(gross as f64, pension_rate as f64);
            let sum = result.tax
                + result.insurance_contribution
                + result.pension_amount
                + result.take_home_pay;
            let tolerance = EPS * (gross as f64).max(1.0);
            prop_assert!((sum - gross as f64).abs() <= tolerance);
            prop_assert!(result.tax >= 0.0);
            prop_assert!(result.insurance_contribution >= 0.0);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_higher_pension_rate_lowers_tax_and_raises_pension(
            gross in 1_000u32..500_000,
            pension_rate in 0u32..50,
            step in 1u32..10
        ) {
            let gross = gross as f64;
            let lower = compute_deductions(gross, pension_rate as f64);
            let higher = compute_deductions(gross, (pension_rate + step) as f64);
            prop_assume!(lower.taxable_amount > UK_2024_25.personal_allowance);

            prop_assert!(higher.tax < lower.tax);
            prop_assert!(higher.pension_amount > lower.pension_amount);
            prop_assert!(higher.insurance_contribution == lower.insurance_contribution);
        }
    }
}
