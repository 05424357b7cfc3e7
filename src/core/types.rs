use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::InputError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioId {
    Paye,
    SoleTrader,
    LtdOutside,
    LtdInside,
    Custom,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 5] = [
        ScenarioId::Paye,
        ScenarioId::SoleTrader,
        ScenarioId::LtdOutside,
        ScenarioId::LtdInside,
        ScenarioId::Custom,
    ];

    /// Scenarios shown when the caller does not choose.
    pub const DEFAULT_ENABLED: [ScenarioId; 4] = [
        ScenarioId::Paye,
        ScenarioId::SoleTrader,
        ScenarioId::LtdOutside,
        ScenarioId::LtdInside,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioId::Paye => "paye",
            ScenarioId::SoleTrader => "sole-trader",
            ScenarioId::LtdOutside => "ltd-outside",
            ScenarioId::LtdInside => "ltd-inside",
            ScenarioId::Custom => "custom",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ScenarioId::Paye => "PAYE",
            ScenarioId::SoleTrader => "Sole Trader",
            ScenarioId::LtdOutside => "Ltd (Outside IR35)",
            ScenarioId::LtdInside => "Ltd (Inside IR35)",
            ScenarioId::Custom => "Custom",
        }
    }

    /// Key used for this scenario's line in chart series.
    pub fn series_key(self) -> &'static str {
        match self {
            ScenarioId::Paye => "paye",
            ScenarioId::SoleTrader => "soleTrader",
            ScenarioId::LtdOutside => "ltdOutside",
            ScenarioId::LtdInside => "ltdInside",
            ScenarioId::Custom => "custom",
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioId {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ScenarioId::ALL
            .into_iter()
            .find(|id| id.as_str() == trimmed || id.series_key() == trimmed)
            .ok_or_else(|| InputError::UnknownScenario(trimmed.to_string()))
    }
}

/// Parameters for the custom scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioConfig {
    pub salary: f64,
    pub expenses: f64,
    pub insurance: f64,
    pub inside_rule_applies: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            salary: 12_570.0,
            expenses: 0.0,
            insurance: 0.0,
            inside_rule_applies: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLineItem {
    pub label: &'static str,
    pub value: f64,
    pub is_subtotal: bool,
    pub is_divider: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl BreakdownLineItem {
    pub fn line(label: &'static str, value: f64) -> Self {
        Self {
            label,
            value,
            is_subtotal: false,
            is_divider: false,
            note: None,
        }
    }

    pub fn deduction(label: &'static str, amount: f64) -> Self {
        Self::line(label, -amount)
    }

    pub fn subtotal(label: &'static str, value: f64) -> Self {
        Self {
            is_subtotal: true,
            ..Self::line(label, value)
        }
    }

    pub fn divider() -> Self {
        Self {
            is_divider: true,
            ..Self::line("", 0.0)
        }
    }

    pub fn with_note(mut self, note: Option<&'static str>) -> Self {
        self.note = note;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub scenario: ScenarioId,
    pub name: &'static str,
    pub items: Vec<BreakdownLineItem>,
    pub net: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedScenario {
    pub scenario: ScenarioId,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub gross: f64,
    pub ranking: Vec<RankedScenario>,
    pub best: Option<ScenarioId>,
    pub worst: Option<ScenarioId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub gross: f64,
    pub net_by_scenario: BTreeMap<ScenarioId, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_series_keys() {
        assert_eq!("sole-trader".parse(), Ok(ScenarioId::SoleTrader));
        assert_eq!(" ltdOutside ".parse(), Ok(ScenarioId::LtdOutside));
        assert_eq!(
            "freelance".parse::<ScenarioId>(),
            Err(InputError::UnknownScenario("freelance".to_string()))
        );
    }

    #[test]
    fn serializes_as_kebab_case_id() {
        let json = serde_json::to_string(&ScenarioId::LtdInside).expect("serialize");
        assert_eq!(json, "\"ltd-inside\"");
    }

    #[test]
    fn divider_is_a_zero_unlabelled_line() {
        let divider = BreakdownLineItem::divider();
        assert!(divider.is_divider);
        assert_eq!(divider.label, "");
        assert_eq!(divider.value, 0.0);
    }
}
