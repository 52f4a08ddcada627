//! The aggregated report model and the table assembler.
//!
//! The assembler is a pure data-shaping step. It produces a fixed,
//! ordered sequence of logical tables, each month's detail is a
//! sub-table keyed by month id, never a dynamically named column, so
//! the output schema does not vary with how many months were selected.
//! Serializing to a file format is the renderer's job, behind the
//! ReportRenderer seam.

use crate::{
    activity::{CompletenessRecord, InactivityFlag},
    classifier::{ChapterAverages, MemberClassification, PerformanceTier, TierAssignment},
    combination::{CodeMatrix, CombinationGrid, MemberCodeSummary, MonthCodes},
    config::EngineConfig,
    error::EngineResult,
    financial::FinancialAggregate,
    matrix::{AggregateMatrix, Matrix, MemberTotals, MonthBreakdown},
    roster::Roster,
    types::{ChapterId, MemberId, MonthId},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ── Report model ─────────────────────────────────────────────────────────────

/// The request-scoped output of one aggregation run. A pure function of
/// its inputs: no identity, no timestamps, nothing non-deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReport {
    pub chapter_id: ChapterId,
    /// Selected months, chronological.
    pub months: Vec<MonthId>,
    pub roster: Roster,
    pub referrals: AggregateMatrix,
    pub meetings: AggregateMatrix,
    pub combinations: CombinationGrid,
    pub financials: Vec<FinancialAggregate>,
    pub completeness: Vec<CompletenessRecord>,
    pub inactivity: Vec<InactivityFlag>,
    pub averages: ChapterAverages,
    pub classifications: Vec<MemberClassification>,
    /// The assembled logical tables, in their fixed render order.
    pub tables: Vec<LogicalTable>,
}

// ── Logical tables ───────────────────────────────────────────────────────────

/// The renderer-agnostic table sequence. Order is fixed: Summary,
/// Referral Matrix, Meeting Matrix, Combination Matrix, Financial
/// Report, then Inactive Members, which is omitted entirely when no
/// member is flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogicalTable {
    Summary(SummaryTable),
    ReferralMatrix(MatrixTable),
    MeetingMatrix(MatrixTable),
    CombinationMatrix(CombinationTable),
    FinancialReport(FinancialTable),
    InactiveMembers(InactiveTable),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub tier: PerformanceTier,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub member_id: MemberId,
    pub display_name: String,
    pub referrals_given: TierAssignment,
    pub meetings_given: TierAssignment,
    pub financial_total: TierAssignment,
    pub both_relationships: TierAssignment,
    pub outside_flag: bool,
    pub present_in_all_selected_months: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub chapter_id: ChapterId,
    pub months: Vec<MonthId>,
    pub member_count: usize,
    pub total_referrals: u64,
    pub total_meetings: u64,
    pub total_financial: f64,
    pub averages: ChapterAverages,
    pub rows: Vec<SummaryRow>,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixMetric {
    Referrals,
    Meetings,
}

/// Aggregate matrix plus per-month breakdowns and member totals, with
/// the roster ordering spelled out for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixTable {
    pub metric: MatrixMetric,
    pub member_ids: Vec<MemberId>,
    pub display_names: Vec<String>,
    pub aggregate: Matrix,
    pub monthly: Vec<MonthBreakdown>,
    pub totals: Vec<MemberTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationTable {
    pub member_ids: Vec<MemberId>,
    pub display_names: Vec<String>,
    pub aggregate: CodeMatrix,
    pub monthly: Vec<MonthCodes>,
    pub summaries: Vec<MemberCodeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRow {
    pub member_id: MemberId,
    pub display_name: String,
    pub total_inside: f64,
    pub total_outside: f64,
    pub total: f64,
    pub referral_count: u32,
    pub avg_referrals_per_month: f64,
    pub avg_value_per_referral: f64,
    pub tier: PerformanceTier,
    pub outside_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthFinancialRow {
    pub member_id: MemberId,
    pub display_name: String,
    pub inside: f64,
    pub outside: f64,
    pub total: f64,
    pub referral_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthFinancialTable {
    pub month: MonthId,
    pub rows: Vec<MonthFinancialRow>,
}

/// Aggregate rows sorted by total value descending, ties kept in
/// roster order, plus one sub-table per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTable {
    pub rows: Vec<FinancialRow>,
    pub monthly: Vec<MonthFinancialTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InactiveRow {
    pub member_id: MemberId,
    pub display_name: String,
    pub last_active_month: MonthId,
    /// Selected months after the last active one.
    pub months_silent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InactiveTable {
    pub rows: Vec<InactiveRow>,
}

// ── Renderer seam ────────────────────────────────────────────────────────────

/// The contract for downstream renderers (screen, spreadsheet export).
/// Render failures must surface as EngineError::Render so callers can
/// tell a failed export from a failed aggregation.
pub trait ReportRenderer {
    fn name(&self) -> &'static str;

    fn render(&self, report: &AggregatedReport) -> EngineResult<Vec<u8>>;
}

// ── Assembly ─────────────────────────────────────────────────────────────────

impl AggregatedReport {
    /// Build the logical table sequence from the structured sections.
    /// Called once by the engine after every section is computed.
    pub(crate) fn assemble_tables(&mut self, config: &EngineConfig) {
        let mut tables = vec![
            LogicalTable::Summary(self.summary_table(config)),
            LogicalTable::ReferralMatrix(self.matrix_table(MatrixMetric::Referrals)),
            LogicalTable::MeetingMatrix(self.matrix_table(MatrixMetric::Meetings)),
            LogicalTable::CombinationMatrix(CombinationTable {
                member_ids: self.roster.ids().cloned().collect(),
                display_names: self.roster.display_names(),
                aggregate: self.combinations.aggregate.clone(),
                monthly: self.combinations.monthly.clone(),
                summaries: self.combinations.summaries.clone(),
            }),
            LogicalTable::FinancialReport(self.financial_table()),
        ];

        let inactive = self.inactive_table();
        if !inactive.rows.is_empty() {
            tables.push(LogicalTable::InactiveMembers(inactive));
        }

        self.tables = tables;
    }

    fn summary_table(&self, config: &EngineConfig) -> SummaryTable {
        let rows = self
            .classifications
            .iter()
            .zip(self.roster.members())
            .zip(&self.completeness)
            .map(|((classification, member), completeness)| SummaryRow {
                member_id: member.id.clone(),
                display_name: member.display_name.clone(),
                referrals_given: classification.referrals_given.clone(),
                meetings_given: classification.meetings_given.clone(),
                financial_total: classification.financial_total.clone(),
                both_relationships: classification.both_relationships.clone(),
                outside_flag: classification.outside_flag,
                present_in_all_selected_months: completeness.present_in_all_selected_months,
            })
            .collect();

        let classifier = &config.classifier;
        let legend = vec![
            LegendEntry {
                tier: PerformanceTier::Excellent,
                label: classifier.legend.excellent.clone(),
                description: format!(">= {:.2}x chapter average", classifier.excellent_min),
            },
            LegendEntry {
                tier: PerformanceTier::Good,
                label: classifier.legend.good.clone(),
                description: format!(">= {:.2}x chapter average", classifier.good_min),
            },
            LegendEntry {
                tier: PerformanceTier::NeedsAttention,
                label: classifier.legend.needs_attention.clone(),
                description: format!("< {:.2}x chapter average", classifier.needs_attention_below),
            },
            LegendEntry {
                tier: PerformanceTier::Neutral,
                label: classifier.legend.neutral.clone(),
                description: "between thresholds, or no chapter average".into(),
            },
        ];

        SummaryTable {
            chapter_id: self.chapter_id.clone(),
            months: self.months.clone(),
            member_count: self.roster.len(),
            total_referrals: self.referrals.totals.iter().map(|t| t.given).sum(),
            total_meetings: self.meetings.totals.iter().map(|t| t.given).sum(),
            total_financial: self.financials.iter().map(|f| f.total).sum(),
            averages: self.averages.clone(),
            rows,
            legend,
        }
    }

    fn matrix_table(&self, metric: MatrixMetric) -> MatrixTable {
        let source = match metric {
            MatrixMetric::Referrals => &self.referrals,
            MatrixMetric::Meetings => &self.meetings,
        };
        MatrixTable {
            metric,
            member_ids: self.roster.ids().cloned().collect(),
            display_names: self.roster.display_names(),
            aggregate: source.total.clone(),
            monthly: source.monthly.clone(),
            totals: source.totals.clone(),
        }
    }

    fn financial_table(&self) -> FinancialTable {
        let mut rows: Vec<FinancialRow> = self
            .financials
            .iter()
            .zip(self.roster.members())
            .zip(&self.classifications)
            .map(|((aggregate, member), classification)| FinancialRow {
                member_id: member.id.clone(),
                display_name: member.display_name.clone(),
                total_inside: aggregate.total_inside,
                total_outside: aggregate.total_outside,
                total: aggregate.total,
                referral_count: aggregate.referral_count,
                avg_referrals_per_month: aggregate.avg_referrals_per_month,
                avg_value_per_referral: aggregate.avg_value_per_referral,
                tier: classification.financial_total.tier,
                outside_flag: classification.outside_flag,
            })
            .collect();
        // Stable sort: equal totals keep roster order, so reports stay
        // deterministic.
        rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));

        let monthly = self
            .months
            .iter()
            .map(|&month| {
                let mut rows: Vec<MonthFinancialRow> = self
                    .financials
                    .iter()
                    .zip(self.roster.members())
                    .filter_map(|(aggregate, member)| {
                        aggregate
                            .monthly
                            .iter()
                            .find(|m| m.month == month)
                            .map(|m| MonthFinancialRow {
                                member_id: member.id.clone(),
                                display_name: member.display_name.clone(),
                                inside: m.inside,
                                outside: m.outside,
                                total: m.total,
                                referral_count: m.referral_count,
                            })
                    })
                    .collect();
                rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
                MonthFinancialTable { month, rows }
            })
            .collect();

        FinancialTable { rows, monthly }
    }

    fn inactive_table(&self) -> InactiveTable {
        let rows = self
            .inactivity
            .iter()
            .map(|flag| {
                let display_name = self
                    .roster
                    .position(&flag.member_id)
                    .map(|i| self.roster.member(i).display_name.clone())
                    .unwrap_or_default();
                InactiveTable::row(flag, display_name, &self.months)
            })
            .collect();
        InactiveTable { rows }
    }
}

impl InactiveTable {
    fn row(flag: &InactivityFlag, display_name: String, months: &[MonthId]) -> InactiveRow {
        let months_silent = months
            .iter()
            .filter(|&&m| m > flag.last_active_month)
            .count() as u32;
        InactiveRow {
            member_id: flag.member_id.clone(),
            display_name,
            last_active_month: flag.last_active_month,
            months_silent,
        }
    }
}
