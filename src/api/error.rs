use thiserror::Error;

use crate::core::TableError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be >= 0")]
    Negative { field: &'static str },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must be > {other}")]
    NotAbove {
        field: &'static str,
        other: &'static str,
    },
    #[error("--horizon-years must be <= {max}")]
    HorizonTooLong { max: u32 },
    #[error("invalid tax table: {0}")]
    Table(#[from] TableError),
}
