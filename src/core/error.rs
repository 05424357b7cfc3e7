use thiserror::Error;

/// Rejected caller input. Raised at the API/CLI boundary only; the
/// calculators themselves are total.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
    #[error("at least one scenario must be enabled")]
    NoScenarios,
}

impl InputError {
    /// Checks a money amount is finite and non-negative.
    pub fn check_amount(field: &'static str, value: f64) -> Result<f64, InputError> {
        if !value.is_finite() {
            return Err(InputError::NotFinite { field });
        }
        if value < 0.0 {
            return Err(InputError::Negative { field, value });
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("{name} must be a finite amount >= 0 (got {value})")]
    NegativeAmount { name: &'static str, value: f64 },
    #[error("{name} must be a rate between 0 and 1 (got {value})")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("{lower} must be below {upper}")]
    ThresholdOrder {
        lower: &'static str,
        upper: &'static str,
    },
}
