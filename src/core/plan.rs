use super::budget::{compute_monthly_breakdown, monthly_savings_contribution};
use super::deductions::compute_deductions_for_year;
use super::projection::{annual_savings_contribution, compute_projection, exceeds_annual_allowance};
use super::types::{PlanInputs, SalaryPlan, TaxYear};

pub fn build_plan(tax_year: &TaxYear, inputs: &PlanInputs) -> SalaryPlan {
    let deductions =
        compute_deductions_for_year(tax_year, inputs.gross_salary, inputs.pension_rate_percent);
    let monthly = compute_monthly_breakdown(
        &deductions,
        inputs.monthly_housing_cost,
        monthly_savings_contribution(inputs.gross_salary, inputs.savings_rate_percent),
    );
    let projection = compute_projection(
        inputs.gross_salary,
        inputs.pension_rate_percent,
        inputs.savings_rate_percent,
        &inputs.projection,
    );

    SalaryPlan {
        deductions,
        categories: monthly.categories(),
        monthly,
        annual_savings_contribution: annual_savings_contribution(
            inputs.gross_salary,
            inputs.savings_rate_percent,
        ),
        allowance_exceeded: exceeds_annual_allowance(
            tax_year,
            inputs.gross_salary,
            inputs.savings_rate_percent,
        ),
        projection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tables::UK_2024_25;
    use crate::core::types::ProjectionSettings;

    fn sample_inputs() -> PlanInputs {
        PlanInputs {
            gross_salary: 55_000.0,
            pension_rate_percent: 5.0,
            savings_rate_percent: 5.0,
            monthly_housing_cost: 1_400.0,
            projection: ProjectionSettings::default(),
        }
    }

    #[test]
    fn plan_agrees_with_individual_calculators() {
        let inputs = sample_inputs();
        let plan = build_plan(&UK_2024_25, &inputs);

        let deductions = compute_deductions_for_year(&UK_2024_25, 55_000.0, 5.0);
        assert_eq!(plan.deductions, deductions);
        assert_eq!(
            plan.monthly,
            compute_monthly_breakdown(
                &deductions,
                1_400.0,
                monthly_savings_contribution(55_000.0, 5.0)
            )
        );
        assert_eq!(plan.categories, plan.monthly.categories());
        assert_eq!(plan.projection.len(), 41);
        assert!((plan.annual_savings_contribution - 2_750.0).abs() < 1e-9);
        assert!(!plan.allowance_exceeded);
    }

    #[test]
    fn plan_flags_savings_above_isa_allowance() {
        let mut inputs = sample_inputs();
        inputs.gross_salary = 200_000.0;
        inputs.savings_rate_percent = 20.0;
        let plan = build_plan(&UK_2024_25, &inputs);
        assert!(plan.allowance_exceeded);
        assert!((plan.annual_savings_contribution - 40_000.0).abs() < 1e-9);
    }

    #[test]
    fn identical_inputs_give_identical_plans() {
        let inputs = sample_inputs();
        assert_eq!(
            build_plan(&UK_2024_25, &inputs),
            build_plan(&UK_2024_25, &inputs)
        );
    }
}
