use std::borrow::Cow;

use serde::Serialize;

/// A contiguous income interval `[lower, upper)` charged at `rate`.
/// `upper == None` marks the open-ended top band.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub lower: f64,
    pub upper: Option<f64>,
    pub rate: f64,
}

impl Band {
    pub const fn new(lower: f64, upper: f64, rate: f64) -> Self {
        Self {
            lower,
            upper: Some(upper),
            rate,
        }
    }

    pub const fn open(lower: f64, rate: f64) -> Self {
        Self {
            lower,
            upper: None,
            rate,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceTaper {
    pub start: f64,
    pub withdrawal_rate: f64,
}

// Headline figures as published: gross thresholds and whole-percent rates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TaxYearFigures {
    pub personal_allowance: f64,
    pub basic_rate_limit: f64,
    pub higher_rate_limit: f64,
    pub basic_rate_percent: f64,
    pub higher_rate_percent: f64,
    pub additional_rate_percent: f64,
    pub insurance_primary_threshold: f64,
    pub insurance_upper_limit: f64,
    pub insurance_main_rate_percent: f64,
    pub insurance_upper_rate_percent: f64,
    pub isa_annual_allowance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxYear {
    pub label: Cow<'static, str>,
    pub personal_allowance: f64,
    pub allowance_taper: Option<AllowanceTaper>,
    // measured above the personal allowance
    pub income_tax_bands: Cow<'static, [Band]>,
    // measured on gross salary
    pub insurance_bands: Cow<'static, [Band]>,
    pub isa_annual_allowance: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionResult {
    pub gross_salary: f64,
    pub taxable_amount: f64,
    pub tax: f64,
    pub insurance_contribution: f64,
    pub pension_amount: f64,
    pub take_home_pay: f64,
}

impl DeductionResult {
    pub fn total_deductions(&self) -> f64 {
        self.tax + self.insurance_contribution + self.pension_amount
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    pub take_home: f64,
    pub tax: f64,
    pub insurance: f64,
    pub pension: f64,
    pub housing: f64,
    pub savings: f64,
    pub buffer: f64,
    pub is_affordable: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BudgetCategory {
    Insurance,
    Pension,
    Housing,
    Savings,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    pub category: BudgetCategory,
    pub monthly: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSettings {
    pub horizon_years: u32,
    pub pension_growth_rate: f64,
    pub savings_growth_rate: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub year: u32,
    pub pension_pool: f64,
    pub savings_pool: f64,
    pub total: f64,
}

pub type ProjectionSeries = Vec<ProjectionPoint>;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlanInputs {
    pub gross_salary: f64,
    pub pension_rate_percent: f64,
    pub savings_rate_percent: f64,
    pub monthly_housing_cost: f64,
    pub projection: ProjectionSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPlan {
    pub deductions: DeductionResult,
    pub monthly: MonthlyBreakdown,
    pub categories: Vec<CategoryAmount>,
    pub annual_savings_contribution: f64,
    pub allowance_exceeded: bool,
    pub projection: ProjectionSeries,
}
