use std::borrow::Cow;

use thiserror::Error;

use super::types::{AllowanceTaper, Band, TaxYear, TaxYearFigures};

pub const UK_2024_25_FIGURES: TaxYearFigures = TaxYearFigures {
    personal_allowance: 12_570.0,
    basic_rate_limit: 50_270.0,
    higher_rate_limit: 125_140.0,
    basic_rate_percent: 20.0,
    higher_rate_percent: 40.0,
    additional_rate_percent: 45.0,
    insurance_primary_threshold: 12_570.0,
    insurance_upper_limit: 50_270.0,
    insurance_main_rate_percent: 8.0,
    insurance_upper_rate_percent: 2.0,
    isa_annual_allowance: 20_000.0,
};

const UK_2024_25_INCOME_TAX_BANDS: [Band; 3] = income_tax_bands(&UK_2024_25_FIGURES);
const UK_2024_25_INSURANCE_BANDS: [Band; 3] = insurance_bands(&UK_2024_25_FIGURES);

// England income tax and Class 1 employee National Insurance.
pub const UK_2024_25: TaxYear = TaxYear {
    label: Cow::Borrowed("uk-2024-25"),
    personal_allowance: UK_2024_25_FIGURES.personal_allowance,
    allowance_taper: None,
    income_tax_bands: Cow::Borrowed(&UK_2024_25_INCOME_TAX_BANDS),
    insurance_bands: Cow::Borrowed(&UK_2024_25_INSURANCE_BANDS),
    isa_annual_allowance: UK_2024_25_FIGURES.isa_annual_allowance,
};

// Income tax bands are measured above the allowance, so the published gross
// limits are shifted down by it.
const fn income_tax_bands(figures: &TaxYearFigures) -> [Band; 3] {
    let basic_width = figures.basic_rate_limit - figures.personal_allowance;
    let higher_top = figures.higher_rate_limit - figures.personal_allowance;
    [
        Band::new(0.0, basic_width, figures.basic_rate_percent / 100.0),
        Band::new(basic_width, higher_top, figures.higher_rate_percent / 100.0),
        Band::open(higher_top, figures.additional_rate_percent / 100.0),
    ]
}

const fn insurance_bands(figures: &TaxYearFigures) -> [Band; 3] {
    let primary = figures.insurance_primary_threshold;
    let upper = figures.insurance_upper_limit;
    [
        Band::new(0.0, primary, 0.0),
        Band::new(primary, upper, figures.insurance_main_rate_percent / 100.0),
        Band::open(upper, figures.insurance_upper_rate_percent / 100.0),
    ]
}

impl TaxYearFigures {
    pub fn to_tax_year(
        &self,
        label: &'static str,
        allowance_taper: Option<AllowanceTaper>,
    ) -> TaxYear {
        let mut insurance = insurance_bands(self).to_vec();
        if self.insurance_primary_threshold <= 0.0 {
            insurance.remove(0);
        }
        TaxYear {
            label: Cow::Borrowed(label),
            personal_allowance: self.personal_allowance,
            allowance_taper,
            income_tax_bands: Cow::Owned(income_tax_bands(self).to_vec()),
            insurance_bands: Cow::Owned(insurance),
            isa_annual_allowance: self.isa_annual_allowance,
        }
    }
}

impl Default for TaxYear {
    fn default() -> Self {
        UK_2024_25
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("{table} bands must not be empty")]
    Empty { table: &'static str },
    #[error("{table} band {index} must start at 0")]
    NonZeroStart { table: &'static str, index: usize },
    #[error("{table} band {index} has a non-finite or negative bound")]
    InvalidBound { table: &'static str, index: usize },
    #[error("{table} band {index} rate must be between 0 and 1")]
    InvalidRate { table: &'static str, index: usize },
    #[error("{table} band {index} upper bound must be greater than its lower bound")]
    EmptyInterval { table: &'static str, index: usize },
    #[error("{table} band {index} must start where the previous band ends")]
    Gap { table: &'static str, index: usize },
    #[error("{table} band {index} must be the last band to be open-ended")]
    OpenBeforeEnd { table: &'static str, index: usize },
    #[error("{table} final band must be open-ended")]
    ClosedTop { table: &'static str },
    #[error("{field} must be a finite, non-negative amount")]
    InvalidAmount { field: &'static str },
    #[error("allowance taper withdrawal rate must be between 0 and 1")]
    InvalidTaper,
}

impl TaxYear {
    pub fn validate(&self) -> Result<(), TableError> {
        if !is_amount(self.personal_allowance) {
            return Err(TableError::InvalidAmount {
                field: "personal allowance",
            });
        }
        if !is_amount(self.isa_annual_allowance) {
            return Err(TableError::InvalidAmount {
                field: "ISA annual allowance",
            });
        }
        if let Some(taper) = self.allowance_taper {
            if !is_amount(taper.start) {
                return Err(TableError::InvalidAmount {
                    field: "allowance taper start",
                });
            }
            if !(0.0..=1.0).contains(&taper.withdrawal_rate) {
                return Err(TableError::InvalidTaper);
            }
        }
        validate_bands("income tax", &self.income_tax_bands)?;
        validate_bands("insurance", &self.insurance_bands)
    }
}

fn is_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn validate_bands(table: &'static str, bands: &[Band]) -> Result<(), TableError> {
    let Some(last) = bands.last() else {
        return Err(TableError::Empty { table });
    };

    let mut expected_lower = 0.0;
    for (index, band) in bands.iter().enumerate() {
        if !is_amount(band.lower) || band.upper.is_some_and(|upper| !upper.is_finite()) {
            return Err(TableError::InvalidBound { table, index });
        }
        if !(0.0..=1.0).contains(&band.rate) {
            return Err(TableError::InvalidRate { table, index });
        }
        if band.lower != expected_lower {
            return Err(if index == 0 {
                TableError::NonZeroStart { table, index }
            } else {
                TableError::Gap { table, index }
            });
        }
        match band.upper {
            Some(upper) if upper <= band.lower => {
                return Err(TableError::EmptyInterval { table, index });
            }
            Some(upper) => expected_lower = upper,
            None if index + 1 != bands.len() => {
                return Err(TableError::OpenBeforeEnd { table, index });
            }
            None => {}
        }
    }

    if last.upper.is_some() {
        return Err(TableError::ClosedTop { table });
    }
    Ok(())
}

// Plain comparisons rather than f64::min/max so a NaN income stays NaN.
pub fn amount_in_band(band: &Band, income: f64) -> f64 {
    let capped = match band.upper {
        Some(upper) if income > upper => upper,
        _ => income,
    };
    let amount = capped - band.lower;
    if amount < 0.0 { 0.0 } else { amount }
}

pub fn tax_across_bands(bands: &[Band], income: f64) -> f64 {
    let mut charged = 0.0;
    for band in bands {
        if income <= band.lower {
            break;
        }
        charged += amount_in_band(band, income) * band.rate;
    }
    charged
}
