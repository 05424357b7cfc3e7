use serde::Serialize;

use super::error::ScheduleError;

/// Tax-year constants consumed by every calculator.
///
/// Thresholds are expressed against the figure each calculator documents:
/// income-tax thresholds apply to taxable income, NI thresholds to earnings or
/// profit, dividend band limits to non-dividend income.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSchedule {
    pub tax_year: &'static str,

    pub personal_allowance: f64,
    pub allowance_taper_start: f64,
    pub allowance_taper_rate: f64,
    pub higher_rate_threshold: f64,
    pub additional_rate_threshold: f64,
    pub basic_rate: f64,
    pub higher_rate: f64,
    pub additional_rate: f64,

    pub ni_primary_threshold: f64,
    pub ni_upper_threshold: f64,
    pub employee_ni_main_rate: f64,
    pub employee_ni_upper_rate: f64,
    pub class4_main_rate: f64,
    pub class4_upper_rate: f64,
    pub class2_threshold: f64,
    pub class2_annual: f64,

    pub corporation_small_rate: f64,
    pub corporation_main_rate: f64,
    pub corporation_lower_limit: f64,
    pub corporation_upper_limit: f64,

    pub dividend_allowance: f64,
    pub dividend_basic_rate: f64,
    pub dividend_higher_rate: f64,
    pub dividend_additional_rate: f64,
}

pub const UK_2024_25: RateSchedule = RateSchedule {
    tax_year: "2024/25",

    personal_allowance: 12_570.0,
    allowance_taper_start: 100_000.0,
    allowance_taper_rate: 0.5,
    higher_rate_threshold: 50_270.0,
    additional_rate_threshold: 125_140.0,
    basic_rate: 0.20,
    higher_rate: 0.40,
    additional_rate: 0.45,

    ni_primary_threshold: 12_570.0,
    ni_upper_threshold: 50_270.0,
    employee_ni_main_rate: 0.12,
    employee_ni_upper_rate: 0.02,
    class4_main_rate: 0.09,
    class4_upper_rate: 0.02,
    // £3.45 a week
    class2_threshold: 6_725.0,
    class2_annual: 179.40,

    corporation_small_rate: 0.19,
    corporation_main_rate: 0.25,
    corporation_lower_limit: 50_000.0,
    corporation_upper_limit: 250_000.0,

    dividend_allowance: 500.0,
    dividend_basic_rate: 0.0875,
    dividend_higher_rate: 0.3375,
    dividend_additional_rate: 0.3935,
};

impl RateSchedule {
    pub fn uk_2024_25() -> &'static RateSchedule {
        &UK_2024_25
    }

    /// Income at which the personal allowance is fully withdrawn.
    pub fn allowance_taper_end(&self) -> f64 {
        self.allowance_taper_start + self.personal_allowance / self.allowance_taper_rate
    }

    /// Flat rate applied to profit above the lower limit inside the marginal
    /// relief band. Chosen so tax meets both flat-rate lines at the limits.
    pub fn corporation_marginal_rate(&self) -> f64 {
        let lower = self.corporation_lower_limit;
        let upper = self.corporation_upper_limit;
        (self.corporation_main_rate * upper - self.corporation_small_rate * lower) / (upper - lower)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        let amounts = [
            ("personalAllowance", self.personal_allowance),
            ("allowanceTaperStart", self.allowance_taper_start),
            ("higherRateThreshold", self.higher_rate_threshold),
            ("additionalRateThreshold", self.additional_rate_threshold),
            ("niPrimaryThreshold", self.ni_primary_threshold),
            ("niUpperThreshold", self.ni_upper_threshold),
            ("class2Threshold", self.class2_threshold),
            ("class2Annual", self.class2_annual),
            ("corporationLowerLimit", self.corporation_lower_limit),
            ("corporationUpperLimit", self.corporation_upper_limit),
            ("dividendAllowance", self.dividend_allowance),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(ScheduleError::NegativeAmount { name, value });
            }
        }

        let rates = [
            ("allowanceTaperRate", self.allowance_taper_rate),
            ("basicRate", self.basic_rate),
            ("higherRate", self.higher_rate),
            ("additionalRate", self.additional_rate),
            ("employeeNiMainRate", self.employee_ni_main_rate),
            ("employeeNiUpperRate", self.employee_ni_upper_rate),
            ("class4MainRate", self.class4_main_rate),
            ("class4UpperRate", self.class4_upper_rate),
            ("corporationSmallRate", self.corporation_small_rate),
            ("corporationMainRate", self.corporation_main_rate),
            ("dividendBasicRate", self.dividend_basic_rate),
            ("dividendHigherRate", self.dividend_higher_rate),
            ("dividendAdditionalRate", self.dividend_additional_rate),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScheduleError::RateOutOfRange { name, value });
            }
        }
        if self.allowance_taper_rate <= 0.0 {
            return Err(ScheduleError::RateOutOfRange {
                name: "allowanceTaperRate",
                value: self.allowance_taper_rate,
            });
        }

        let ladders = [
            (
                "higherRateThreshold",
                self.higher_rate_threshold,
                "additionalRateThreshold",
                self.additional_rate_threshold,
            ),
            (
                "niPrimaryThreshold",
                self.ni_primary_threshold,
                "niUpperThreshold",
                self.ni_upper_threshold,
            ),
            (
                "corporationLowerLimit",
                self.corporation_lower_limit,
                "corporationUpperLimit",
                self.corporation_upper_limit,
            ),
        ];
        for (lower, lower_value, upper, upper_value) in ladders {
            if lower_value >= upper_value {
                return Err(ScheduleError::ThresholdOrder { lower, upper });
            }
        }

        Ok(())
    }
}

impl Default for RateSchedule {
    fn default() -> Self {
        UK_2024_25
    }
}
