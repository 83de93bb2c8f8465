//! What-if yield planner.
//!
//! The planner uses a fixed linear model:
//!
//! ```text
//! yield = clamp(7.0 + fertilizer_bonus + 0.05 * rainfall - 0.2 * pest_pressure, 5, 12)
//! ```
//!
//! rounded to one decimal. Inputs outside their documented ranges are
//! clamped into range before scoring.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base yield before any adjustment, tons/ha.
pub const BASE_YIELD: f64 = 7.0;
/// Lower bound of the projected yield, tons/ha.
pub const MIN_YIELD: f64 = 5.0;
/// Upper bound of the projected yield, tons/ha.
pub const MAX_YIELD: f64 = 12.0;
/// Current forecast the scenario is compared against, tons/ha.
pub const BASELINE_YIELD: f64 = 7.8;

pub const RAINFALL_RANGE: (f64, f64) = (0.0, 100.0);
pub const PEST_RANGE: (f64, f64) = (0.0, 10.0);

const RAIN_FACTOR: f64 = 0.05;
const PEST_FACTOR: f64 = 0.2;

/// Fertilizer application tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FertilizerTier {
    #[default]
    None,
    Medium,
    High,
    Premium,
}

impl FertilizerTier {
    pub fn all() -> &'static [FertilizerTier] {
        &[
            FertilizerTier::None,
            FertilizerTier::Medium,
            FertilizerTier::High,
            FertilizerTier::Premium,
        ]
    }

    /// Yield bonus in tons/ha.
    pub fn bonus(&self) -> f64 {
        match self {
            FertilizerTier::None => 0.0,
            FertilizerTier::Medium => 1.0,
            FertilizerTier::High => 1.5,
            FertilizerTier::Premium => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FertilizerTier::None => "none",
            FertilizerTier::Medium => "medium",
            FertilizerTier::High => "high",
            FertilizerTier::Premium => "premium",
        }
    }

    /// Next tier up, saturating at premium.
    pub fn step_up(self) -> Self {
        match self {
            FertilizerTier::None => FertilizerTier::Medium,
            FertilizerTier::Medium => FertilizerTier::High,
            FertilizerTier::High | FertilizerTier::Premium => FertilizerTier::Premium,
        }
    }

    /// Next tier down, saturating at none.
    pub fn step_down(self) -> Self {
        match self {
            FertilizerTier::None | FertilizerTier::Medium => FertilizerTier::None,
            FertilizerTier::High => FertilizerTier::Medium,
            FertilizerTier::Premium => FertilizerTier::High,
        }
    }
}

impl fmt::Display for FertilizerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FertilizerTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(FertilizerTier::None),
            "medium" => Ok(FertilizerTier::Medium),
            "high" => Ok(FertilizerTier::High),
            "premium" => Ok(FertilizerTier::Premium),
            _ => Err(format!(
                "Invalid fertilizer tier: {}. Valid values: none, medium, high, premium",
                s
            )),
        }
    }
}

/// Planner inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    /// Rainfall, 0-100 mm
    pub rainfall: f64,
    pub fertilizer: FertilizerTier,
    /// Pest pressure, 0-10
    pub pest_pressure: f64,
}

impl Default for ScenarioInputs {
    fn default() -> Self {
        Self {
            rainfall: 50.0,
            fertilizer: FertilizerTier::Medium,
            pest_pressure: 3.0,
        }
    }
}

impl ScenarioInputs {
    /// Copy with every input clamped into its documented range.
    pub fn clamped(&self) -> Self {
        Self {
            rainfall: clamp_input(self.rainfall, RAINFALL_RANGE),
            fertilizer: self.fertilizer,
            pest_pressure: clamp_input(self.pest_pressure, PEST_RANGE),
        }
    }
}

fn clamp_input(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if value.is_nan() { lo } else { value.clamp(lo, hi) }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Projected yield in tons/ha for the given conditions.
pub fn score(rainfall: f64, fertilizer: FertilizerTier, pest_pressure: f64) -> f64 {
    let rainfall = clamp_input(rainfall, RAINFALL_RANGE);
    let pest_pressure = clamp_input(pest_pressure, PEST_RANGE);
    let raw = BASE_YIELD + fertilizer.bonus() + RAIN_FACTOR * rainfall - PEST_FACTOR * pest_pressure;
    round1(raw.clamp(MIN_YIELD, MAX_YIELD))
}

/// Scenario result compared against the baseline forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub inputs: ScenarioInputs,
    pub baseline: f64,
    pub projected: f64,
    /// Projected minus baseline, tons/ha
    pub difference: f64,
    /// Change relative to baseline, percent, one decimal
    pub percent_change: f64,
}

impl ScenarioReport {
    pub fn new(inputs: ScenarioInputs) -> Self {
        let inputs = inputs.clamped();
        let projected = score(inputs.rainfall, inputs.fertilizer, inputs.pest_pressure);
        let difference = projected - BASELINE_YIELD;
        Self {
            inputs,
            baseline: BASELINE_YIELD,
            projected,
            difference: round1(difference),
            percent_change: round1(difference / BASELINE_YIELD * 100.0),
        }
    }

    /// Human summary, e.g. "projected yield is 9.1 tons/ha (+16.7% vs baseline)".
    pub fn summary(&self) -> String {
        let sign = if self.difference > 0.0 { "+" } else { "" };
        format!(
            "Based on your inputs, the projected yield is {:.1} tons/ha. This represents a {}{:.1}% change compared to the current baseline forecast.",
            self.projected, sign, self.percent_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_documented_example() {
        assert_eq!(score(70.0, FertilizerTier::High, 2.0), 11.6);
    }

    #[test]
    fn test_clamps_to_upper_bound() {
        assert_eq!(score(100.0, FertilizerTier::Premium, 0.0), MAX_YIELD);
    }

    #[test]
    fn test_clamps_to_lower_bound() {
        assert_eq!(score(0.0, FertilizerTier::None, 10.0), MIN_YIELD);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        assert_eq!(
            score(250.0, FertilizerTier::None, -4.0),
            score(100.0, FertilizerTier::None, 0.0)
        );
        assert_eq!(score(f64::NAN, FertilizerTier::None, 0.0), 7.0);
    }

    #[test]
    fn test_tier_bonus_values() {
        let bonuses: Vec<f64> = FertilizerTier::all().iter().map(|t| t.bonus()).collect();
        assert_eq!(bonuses, vec![0.0, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_tier_steps_saturate() {
        assert_eq!(FertilizerTier::Premium.step_up(), FertilizerTier::Premium);
        assert_eq!(FertilizerTier::None.step_down(), FertilizerTier::None);
        assert_eq!(FertilizerTier::Medium.step_up(), FertilizerTier::High);
    }

    #[test]
    fn test_report_against_baseline() {
        let report = ScenarioReport::new(ScenarioInputs {
            rainfall: 70.0,
            fertilizer: FertilizerTier::High,
            pest_pressure: 2.0,
        });
        assert_eq!(report.projected, 11.6);
        assert_eq!(report.difference, 3.8);
        assert_eq!(report.percent_change, 48.7);
        assert!(report.summary().contains("+48.7% change"));
    }

    #[test]
    fn test_report_negative_change_has_no_plus() {
        let report = ScenarioReport::new(ScenarioInputs {
            rainfall: 0.0,
            fertilizer: FertilizerTier::None,
            pest_pressure: 5.0,
        });
        assert_eq!(report.projected, 6.0);
        assert!(report.summary().contains("-23.1% change"));
    }

    fn tier() -> impl Strategy<Value = FertilizerTier> {
        prop::sample::select(FertilizerTier::all().to_vec())
    }

    proptest! {
        #[test]
        fn score_is_bounded(rain in 0.0f64..=100.0, t in tier(), pest in 0.0f64..=10.0) {
            let y = score(rain, t, pest);
            prop_assert!((MIN_YIELD..=MAX_YIELD).contains(&y));
        }

        #[test]
        fn score_non_decreasing_in_rainfall(a in 0.0f64..=100.0, b in 0.0f64..=100.0, t in tier(), pest in 0.0f64..=10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(score(lo, t, pest) <= score(hi, t, pest));
        }

        #[test]
        fn score_non_increasing_in_pest(rain in 0.0f64..=100.0, t in tier(), a in 0.0f64..=10.0, b in 0.0f64..=10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(score(rain, t, lo) >= score(rain, t, hi));
        }

        #[test]
        fn score_non_decreasing_in_tier(rain in 0.0f64..=100.0, a in tier(), b in tier(), pest in 0.0f64..=10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(score(rain, lo, pest) <= score(rain, hi, pest));
        }

        #[test]
        fn score_has_one_decimal(rain in 0.0f64..=100.0, t in tier(), pest in 0.0f64..=10.0) {
            let y = score(rain, t, pest);
            prop_assert!(((y * 10.0).round() - y * 10.0).abs() < 1e-9);
        }
    }
}
