use super::types::{BudgetCategory, CategoryAmount, DeductionResult, MonthlyBreakdown};

const MONTHS_PER_YEAR: f64 = 12.0;

pub fn compute_monthly_breakdown(
    deductions: &DeductionResult,
    monthly_housing_cost: f64,
    monthly_savings_contribution: f64,
) -> MonthlyBreakdown {
    let take_home = deductions.take_home_pay / MONTHS_PER_YEAR;
    let buffer = take_home - monthly_housing_cost - monthly_savings_contribution;

    MonthlyBreakdown {
        take_home,
        tax: deductions.tax / MONTHS_PER_YEAR,
        insurance: deductions.insurance_contribution / MONTHS_PER_YEAR,
        pension: deductions.pension_amount / MONTHS_PER_YEAR,
        housing: monthly_housing_cost,
        savings: monthly_savings_contribution,
        buffer,
        is_affordable: buffer > 0.0,
    }
}

pub fn monthly_savings_contribution(gross_salary: f64, savings_rate_percent: f64) -> f64 {
    gross_salary * savings_rate_percent / 100.0 / MONTHS_PER_YEAR
}

impl MonthlyBreakdown {
    pub fn categories(&self) -> Vec<CategoryAmount> {
        [
            (BudgetCategory::Insurance, self.insurance),
            (BudgetCategory::Pension, self.pension),
            (BudgetCategory::Housing, self.housing),
            (BudgetCategory::Savings, self.savings),
        ]
        .into_iter()
        .map(|(category, monthly)| CategoryAmount { category, monthly })
        .collect()
    }
}
