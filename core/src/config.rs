//! Engine configuration.
//!
//! Everything that is a policy choice rather than a law of the report
//! lives here: tier thresholds, the legend text, and the two averaging
//! policies that observed chapters disagree on. The engine never reads
//! module-level constants, tests inject alternative configs freely.

use serde::{Deserialize, Serialize};

/// Thresholds and labels for the per-metric performance tiers.
///
/// Tier assignment for a ratio r = value / chapter_average:
///   r >= excellent_min                  -> Excellent
///   good_min <= r < excellent_min       -> Good
///   r < needs_attention_below           -> NeedsAttention
///   needs_attention_below <= r < good_min -> Neutral
/// A zero chapter average is always Neutral, whatever the value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub excellent_min: f64,
    pub good_min: f64,
    pub needs_attention_below: f64,
    /// The outside-business flag fires when
    /// total_outside > outside_flag_multiplier * total_inside.
    pub outside_flag_multiplier: f64,
    pub legend: TierLegend,
}

/// Display labels for the report legend, one per tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierLegend {
    pub excellent: String,
    pub good: String,
    pub needs_attention: String,
    pub neutral: String,
}

/// Which members count toward the chapter average for each metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragePopulation {
    /// Every canonical roster member, including long-inactive ones.
    FullRoster,
    /// Only members with recorded activity in the final selected month.
    ActiveInFinalMonth,
}

/// Denominator for a member's average referrals per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageDenominator {
    /// Months in which the member had any financial activity.
    MonthsWithActivity,
    /// Every selected month, whether or not the member had data.
    MonthsSelected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub average_population: AveragePopulation,
    pub monthly_average_denominator: AverageDenominator,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig {
                excellent_min: 1.75,
                good_min: 0.75,
                needs_attention_below: 0.5,
                outside_flag_multiplier: 2.0,
                legend: TierLegend {
                    excellent: "Excellent".into(),
                    good: "Good".into(),
                    needs_attention: "Needs attention".into(),
                    neutral: "Neutral".into(),
                },
            },
            average_population: AveragePopulation::FullRoster,
            monthly_average_denominator: AverageDenominator::MonthsWithActivity,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. In tests, use EngineConfig::default().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
