use super::types::{ProjectionPoint, ProjectionSeries, ProjectionSettings, TaxYear};

pub const DEFAULT_HORIZON_YEARS: u32 = 40;
pub const DEFAULT_PENSION_GROWTH_RATE: f64 = 0.05;
pub const DEFAULT_SAVINGS_GROWTH_RATE: f64 = 0.04;

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
            pension_growth_rate: DEFAULT_PENSION_GROWTH_RATE,
            savings_growth_rate: DEFAULT_SAVINGS_GROWTH_RATE,
        }
    }
}

pub fn annual_pension_contribution(gross_salary: f64, pension_rate_percent: f64) -> f64 {
    gross_salary * pension_rate_percent / 100.0
}

pub fn annual_savings_contribution(gross_salary: f64, savings_rate_percent: f64) -> f64 {
    gross_salary * savings_rate_percent / 100.0
}

pub fn exceeds_annual_allowance(
    tax_year: &TaxYear,
    gross_salary: f64,
    savings_rate_percent: f64,
) -> bool {
    annual_savings_contribution(gross_salary, savings_rate_percent) > tax_year.isa_annual_allowance
}

/// Year 0 is the empty anchor. Every later year adds that year's contribution
/// and then grows the pool; negative growth is applied as given.
pub fn compute_projection(
    gross_salary: f64,
    pension_rate_percent: f64,
    savings_rate_percent: f64,
    settings: &ProjectionSettings,
) -> ProjectionSeries {
    let pension_contribution = annual_pension_contribution(gross_salary, pension_rate_percent);
    let savings_contribution = annual_savings_contribution(gross_salary, savings_rate_percent);
    let pension_growth = 1.0 + settings.pension_growth_rate;
    let savings_growth = 1.0 + settings.savings_growth_rate;

    let mut series = Vec::with_capacity(settings.horizon_years as usize + 1);
    let mut pension_pool = 0.0;
    let mut savings_pool = 0.0;
    series.push(ProjectionPoint {
        year: 0,
        pension_pool,
        savings_pool,
        total: 0.0,
    });

    for year in 1..=settings.horizon_years {
        pension_pool += pension_contribution;
        savings_pool += savings_contribution;

        pension_pool *= pension_growth;
        savings_pool *= savings_growth;

        series.push(ProjectionPoint {
            year,
            pension_pool,
            savings_pool,
            total: pension_pool + savings_pool,
        });
    }

    series
}
