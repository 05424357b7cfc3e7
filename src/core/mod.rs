mod compare;
mod engine;
mod error;
mod rates;
mod tax;
mod types;

pub use compare::{compare_scenarios, dedup_enabled, generate_series, series_step};
pub use engine::{evaluate_scenario, scenario_net};
pub use error::{InputError, ScheduleError};
pub use rates::{RateSchedule, UK_2024_25};
pub use tax::{
    class2_ni, class4_ni, corporation_tax, dividend_tax, employee_ni, income_tax,
    personal_allowance,
};
pub use types::{
    BreakdownLineItem, ComparisonResult, RankedScenario, ScenarioConfig, ScenarioId,
    ScenarioResult, SeriesPoint,
};
