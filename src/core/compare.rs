use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::engine::scenario_net;
use super::rates::RateSchedule;
use super::types::{ComparisonResult, RankedScenario, ScenarioConfig, ScenarioId, SeriesPoint};

/// Number of chart points aimed for across the income range.
pub const SERIES_TARGET_POINTS: f64 = 100.0;
pub const SERIES_MIN_STEP: f64 = 1_000.0;
/// Upper bound on points per series, however wide the range.
pub const SERIES_MAX_POINTS: usize = 102;

/// Drops repeated ids, keeping the first occurrence.
pub fn dedup_enabled(enabled: &[ScenarioId]) -> Vec<ScenarioId> {
    let mut unique = Vec::with_capacity(enabled.len());
    for &scenario in enabled {
        if !unique.contains(&scenario) {
            unique.push(scenario);
        }
    }
    unique
}

/// Ranks enabled scenarios best to worst. Equal nets keep their enabled
/// order. `best`/`worst` stay empty unless at least two scenarios compete.
pub fn compare_scenarios(
    rates: &RateSchedule,
    enabled: &[ScenarioId],
    gross: f64,
    config: &ScenarioConfig,
) -> ComparisonResult {
    let mut ranking: Vec<RankedScenario> = dedup_enabled(enabled)
        .into_iter()
        .map(|scenario| RankedScenario {
            scenario,
            net: scenario_net(rates, scenario, gross, config),
        })
        .collect();
    // sort_by is stable
    ranking.sort_by(|a, b| b.net.partial_cmp(&a.net).unwrap_or(Ordering::Equal));

    let (best, worst) = if ranking.len() >= 2 {
        (
            ranking.first().map(|r| r.scenario),
            ranking.last().map(|r| r.scenario),
        )
    } else {
        (None, None)
    };

    ComparisonResult {
        gross: gross.max(0.0),
        ranking,
        best,
        worst,
    }
}

pub fn series_step(min_income: f64, max_income: f64) -> f64 {
    ((max_income - min_income) / SERIES_TARGET_POINTS)
        .round()
        .max(SERIES_MIN_STEP)
}

/// Net income of every enabled scenario from `min_income` to `max_income`.
/// The last point lands on `max_income` only when the range divides evenly.
pub fn generate_series(
    rates: &RateSchedule,
    enabled: &[ScenarioId],
    min_income: f64,
    max_income: f64,
    config: &ScenarioConfig,
) -> Vec<SeriesPoint> {
    if !min_income.is_finite() || !max_income.is_finite() || max_income < min_income {
        return Vec::new();
    }

    let enabled = dedup_enabled(enabled);
    let step = series_step(min_income, max_income);
    if !step.is_finite() {
        return Vec::new();
    }
    let count = ((max_income - min_income) / step)
        .floor()
        .min(SERIES_MAX_POINTS as f64 - 1.0) as usize;
    let mut points: Vec<SeriesPoint> = Vec::with_capacity(count + 1);
    for index in 0..=count {
        let gross = min_income + step * index as f64;
        if gross > max_income {
            break;
        }
        // above 2^53 the step can vanish in rounding
        if points.last().is_some_and(|last| gross <= last.gross) {
            break;
        }
        let net_by_scenario: BTreeMap<ScenarioId, f64> = enabled
            .iter()
            .map(|&scenario| (scenario, scenario_net(rates, scenario, gross, config)))
            .collect();
        points.push(SeriesPoint {
            gross,
            net_by_scenario,
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::evaluate_scenario;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn rates() -> &'static RateSchedule {
        RateSchedule::uk_2024_25()
    }

    #[test]
    fn ranking_is_best_to_worst() {
        let result = compare_scenarios(
            rates(),
            &ScenarioId::DEFAULT_ENABLED,
            100_000.0,
            &ScenarioConfig::default(),
        );
        assert_eq!(result.ranking.len(), 4);
        for pair in result.ranking.windows(2) {
            assert!(pair[0].net >= pair[1].net);
        }
        // sole trader 70,515; PAYE 69,563.40; ltd outside 67,221.07; ltd inside 66,663.40
        let order: Vec<ScenarioId> = result.ranking.iter().map(|r| r.scenario).collect();
        assert_eq!(
            order,
            vec![
                ScenarioId::SoleTrader,
                ScenarioId::Paye,
                ScenarioId::LtdOutside,
                ScenarioId::LtdInside
            ]
        );
        assert_eq!(result.best, Some(ScenarioId::SoleTrader));
        assert_eq!(result.worst, Some(ScenarioId::LtdInside));
    }

    #[test]
    fn single_scenario_is_never_flagged() {
        let result = compare_scenarios(
            rates(),
            &[ScenarioId::SoleTrader],
            50_000.0,
            &ScenarioConfig::default(),
        );
        assert_eq!(result.ranking.len(), 1);
        assert_eq!(result.best, None);
        assert_eq!(result.worst, None);
    }

    #[test]
    fn no_scenarios_gives_empty_ranking() {
        let result = compare_scenarios(rates(), &[], 50_000.0, &ScenarioConfig::default());
        assert!(result.ranking.is_empty());
        assert_eq!(result.best, None);
    }

    #[test]
    fn ties_keep_enabled_order() {
        // at zero gross every scenario nets zero
        let enabled = [
            ScenarioId::LtdInside,
            ScenarioId::Paye,
            ScenarioId::Custom,
            ScenarioId::SoleTrader,
        ];
        let result = compare_scenarios(rates(), &enabled, 0.0, &ScenarioConfig::default());
        let order: Vec<ScenarioId> = result.ranking.iter().map(|r| r.scenario).collect();
        assert_eq!(order, enabled.to_vec());
        assert_eq!(result.best, Some(ScenarioId::LtdInside));
    }

    #[test]
    fn duplicate_ids_are_ranked_once() {
        let enabled = [ScenarioId::Paye, ScenarioId::Paye, ScenarioId::SoleTrader];
        let result = compare_scenarios(rates(), &enabled, 30_000.0, &ScenarioConfig::default());
        assert_eq!(result.ranking.len(), 2);
    }

    #[test]
    fn series_covers_range_with_min_step() {
        let points = generate_series(
            rates(),
            &[ScenarioId::Paye],
            0.0,
            50_000.0,
            &ScenarioConfig::default(),
        );
        assert_eq!(points.len(), 51);
        assert_eq!(points[0].gross, 0.0);
        assert_eq!(points[50].gross, 50_000.0);
    }

    #[test]
    fn series_default_range_has_101_points() {
        let points = generate_series(
            rates(),
            &ScenarioId::DEFAULT_ENABLED,
            0.0,
            200_000.0,
            &ScenarioConfig::default(),
        );
        assert_eq!(series_step(0.0, 200_000.0), 2_000.0);
        assert_eq!(points.len(), 101);
        assert_eq!(points[100].gross, 200_000.0);
        assert!(points
            .iter()
            .all(|p| p.net_by_scenario.len() == 4
                && !p.net_by_scenario.contains_key(&ScenarioId::Custom)));
    }

    #[test]
    fn series_may_stop_short_of_max() {
        let points = generate_series(
            rates(),
            &[ScenarioId::Paye],
            0.0,
            2_500.0,
            &ScenarioConfig::default(),
        );
        let grosses: Vec<f64> = points.iter().map(|p| p.gross).collect();
        assert_eq!(grosses, vec![0.0, 1_000.0, 2_000.0]);
    }

    #[test]
    fn series_single_point_when_min_equals_max() {
        let points = generate_series(
            rates(),
            &[ScenarioId::Paye],
            40_000.0,
            40_000.0,
            &ScenarioConfig::default(),
        );
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn series_stays_finite_when_step_is_below_float_resolution() {
        let points = generate_series(
            rates(),
            &[ScenarioId::Paye],
            1e30,
            1e30,
            &ScenarioConfig::default(),
        );
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].gross, 1e30);

        let points = generate_series(
            rates(),
            &[ScenarioId::Paye],
            1e30,
            1e30 + 1e16,
            &ScenarioConfig::default(),
        );
        assert!(!points.is_empty());
        assert!(points.len() <= SERIES_MAX_POINTS);
        for pair in points.windows(2) {
            assert!(pair[1].gross > pair[0].gross);
        }
    }

    #[test]
    fn negative_gross_is_reported_as_zero() {
        let result = compare_scenarios(
            rates(),
            &ScenarioId::DEFAULT_ENABLED,
            -2_500.0,
            &ScenarioConfig::default(),
        );
        assert_eq!(result.gross, 0.0);
        assert!(result.ranking.iter().all(|r| r.net == 0.0));
    }

    #[test]
    fn inverted_range_is_empty() {
        let points = generate_series(
            rates(),
            &ScenarioId::ALL,
            100_000.0,
            50_000.0,
            &ScenarioConfig::default(),
        );
        assert!(points.is_empty());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_ranking_is_sorted_and_complete(
            gross in 0u32..300_000,
            mask in 1u8..32
        ) {
            let enabled: Vec<ScenarioId> = ScenarioId::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, id)| id)
                .collect();
            let config = ScenarioConfig::default();
            let result = compare_scenarios(rates(), &enabled, gross as f64, &config);
            prop_assert_eq!(result.ranking.len(), enabled.len());
            for pair in result.ranking.windows(2) {
                prop_assert!(pair[0].net >= pair[1].net);
            }
            for ranked in &result.ranking {
                let full = evaluate_scenario(rates(), ranked.scenario, gross as f64, &config);
                prop_assert!((full.net - ranked.net).abs() <= EPS);
            }
            prop_assert_eq!(result.best.is_some(), enabled.len() >= 2);
        }

        #[test]
        fn prop_series_points_stay_in_range(
            min in 0u32..200_000,
            span in 0u32..400_000
        ) {
            let (min, max) = (min as f64, (min + span) as f64);
            let points = generate_series(rates(), &[ScenarioId::Paye], min, max, &ScenarioConfig::default());
            prop_assert!(!points.is_empty());
            prop_assert!(points.len() <= SERIES_MAX_POINTS);
            prop_assert_eq!(points[0].gross, min);
            for point in &points {
                prop_assert!(point.gross <= max);
            }
        }
    }
}
