mod budget;
mod deductions;
mod plan;
mod projection;
mod tables;
mod types;

pub use budget::{compute_monthly_breakdown, monthly_savings_contribution};
pub use deductions::{compute_deductions, compute_deductions_for_year};
pub use plan::build_plan;
pub use projection::{
    DEFAULT_HORIZON_YEARS, DEFAULT_PENSION_GROWTH_RATE, DEFAULT_SAVINGS_GROWTH_RATE,
    annual_pension_contribution, annual_savings_contribution, compute_projection,
    exceeds_annual_allowance,
};
pub use tables::{TableError, UK_2024_25, UK_2024_25_FIGURES, amount_in_band, tax_across_bands};
pub use types::{
    AllowanceTaper, Band, BudgetCategory, CategoryAmount, DeductionResult, MonthlyBreakdown,
    PlanInputs, ProjectionPoint, ProjectionSeries, ProjectionSettings, SalaryPlan, TaxYear,
    TaxYearFigures,
};
