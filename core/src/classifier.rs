//! Performance classification: chapter-relative tiers per metric.
//!
//! Each metric is classified independently against the chapter average
//! for that metric. A member can be Excellent at referrals and
//! NeedsAttention at meetings at the same time, the classifier never
//! correlates metrics.
//!
//! Guard: a zero chapter average classifies everyone Neutral for that
//! metric. A degenerate chapter neither rewards nor penalizes anyone.

use crate::{
    activity::CompletenessRecord,
    combination::CombinationGrid,
    config::{AveragePopulation, ClassifierConfig, EngineConfig},
    financial::FinancialAggregate,
    matrix::AggregateMatrix,
    roster::Roster,
    types::{MemberId, MonthId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Excellent,
    Good,
    NeedsAttention,
    Neutral,
}

/// One member's value, ratio to the chapter average, and tier for a
/// single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAssignment {
    pub value: f64,
    pub ratio: f64,
    pub tier: PerformanceTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberClassification {
    pub member_id: MemberId,
    pub referrals_given: TierAssignment,
    pub meetings_given: TierAssignment,
    pub financial_total: TierAssignment,
    pub both_relationships: TierAssignment,
    /// Secondary signal, OR'd with the financial tier rather than
    /// replacing it: disproportionate outside-chapter business.
    pub outside_flag: bool,
}

/// Chapter averages underlying the tiers, kept for the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterAverages {
    pub referrals_given: f64,
    pub meetings_given: f64,
    pub financial_total: f64,
    pub both_relationships: f64,
    /// How many members the averages were computed over.
    pub population: usize,
}

fn assign(value: f64, average: f64, config: &ClassifierConfig) -> TierAssignment {
    if average <= 0.0 {
        return TierAssignment {
            value,
            ratio: 0.0,
            tier: PerformanceTier::Neutral,
        };
    }
    let ratio = value / average;
    let tier = if ratio >= config.excellent_min {
        PerformanceTier::Excellent
    } else if ratio >= config.good_min {
        PerformanceTier::Good
    } else if ratio < config.needs_attention_below {
        PerformanceTier::NeedsAttention
    } else {
        PerformanceTier::Neutral
    };
    TierAssignment { value, ratio, tier }
}

fn mean(values: &[f64], included: &[bool]) -> f64 {
    let count = included.iter().filter(|&&inc| inc).count();
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = values
        .iter()
        .zip(included)
        .filter_map(|(v, &inc)| inc.then_some(*v))
        .sum();
    sum / count as f64
}

/// Classify every roster member on every metric.
///
/// `average_population` controls who the averages are computed over;
/// the tiers themselves are always assigned to every member.
pub fn classify(
    config: &EngineConfig,
    roster: &Roster,
    referrals: &AggregateMatrix,
    meetings: &AggregateMatrix,
    financials: &[FinancialAggregate],
    combinations: &CombinationGrid,
    completeness: &[CompletenessRecord],
    final_month: MonthId,
) -> (ChapterAverages, Vec<MemberClassification>) {
    let included: Vec<bool> = match config.average_population {
        AveragePopulation::FullRoster => vec![true; roster.len()],
        AveragePopulation::ActiveInFinalMonth => completeness
            .iter()
            .map(|c| c.active_months.contains(&final_month))
            .collect(),
    };

    let referral_values: Vec<f64> = referrals.totals.iter().map(|t| t.given as f64).collect();
    let meeting_values: Vec<f64> = meetings.totals.iter().map(|t| t.given as f64).collect();
    let financial_values: Vec<f64> = financials.iter().map(|f| f.total).collect();
    let both_values: Vec<f64> = combinations
        .summaries
        .iter()
        .map(|s| s.aggregate.both as f64)
        .collect();

    let averages = ChapterAverages {
        referrals_given: mean(&referral_values, &included),
        meetings_given: mean(&meeting_values, &included),
        financial_total: mean(&financial_values, &included),
        both_relationships: mean(&both_values, &included),
        population: included.iter().filter(|&&inc| inc).count(),
    };

    let classifier = &config.classifier;
    let classifications = (0..roster.len())
        .map(|i| MemberClassification {
            member_id: roster.member(i).id.clone(),
            referrals_given: assign(referral_values[i], averages.referrals_given, classifier),
            meetings_given: assign(meeting_values[i], averages.meetings_given, classifier),
            financial_total: assign(financial_values[i], averages.financial_total, classifier),
            both_relationships: assign(
                both_values[i],
                averages.both_relationships,
                classifier,
            ),
            outside_flag: financials[i].total_outside
                > classifier.outside_flag_multiplier * financials[i].total_inside,
        })
        .collect();

    (averages, classifications)
}
