//! The aggregation engine: one call in, one complete report out.
//!
//! PIPELINE ORDER (fixed, documented, never reordered):
//!   1. Input validation (months, coverage, snapshot shape, chapter)
//!   2. Member reconciliation (canonical roster)
//!   3. Matrix reindexing and aggregation (referrals, then meetings)
//!   4. Combination encoding
//!   5. Financial aggregation
//!   6. Completeness and inactivity tracking
//!   7. Performance classification
//!   8. Table assembly
//!
//! RULES:
//!   - The engine is a pure function of (snapshots, selected months,
//!     config). No clocks, no RNG, no shared state between calls.
//!   - A failure at any stage aborts the whole run. A partial report
//!     is never returned.

use crate::{
    activity::track_activity,
    classifier::classify,
    combination::encode_grid,
    config::EngineConfig,
    error::{EngineResult, ValidationError},
    financial::aggregate_financials,
    matrix::{reindex, AggregateMatrix, MonthBreakdown},
    report::AggregatedReport,
    roster::reconcile,
    snapshot::MonthlySnapshot,
    types::MonthId,
};
use std::collections::BTreeMap;

pub struct ReportEngine {
    config: EngineConfig,
}

impl ReportEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one aggregation over `snapshots` for the `selected` months.
    ///
    /// Snapshots for unselected months are ignored. Every selected
    /// month must be covered by exactly one snapshot.
    pub fn aggregate(
        &self,
        snapshots: &[MonthlySnapshot],
        selected: &[MonthId],
    ) -> EngineResult<AggregatedReport> {
        // 1. Validation.
        if snapshots.is_empty() {
            return Err(ValidationError::NoSnapshots.into());
        }
        if selected.is_empty() {
            return Err(ValidationError::NoMonthsSelected.into());
        }

        let expected_chapter = &snapshots[0].chapter_id;
        for snapshot in snapshots {
            if &snapshot.chapter_id != expected_chapter {
                return Err(ValidationError::ChapterMismatch {
                    expected: expected_chapter.clone(),
                    found: snapshot.chapter_id.clone(),
                    month: snapshot.month,
                }
                .into());
            }
        }

        let mut months: Vec<MonthId> = selected.to_vec();
        months.sort();
        months.dedup();

        let mut by_month: BTreeMap<MonthId, &MonthlySnapshot> = BTreeMap::new();
        for snapshot in snapshots {
            if !months.contains(&snapshot.month) {
                log::debug!("ignoring snapshot for unselected month {}", snapshot.month);
                continue;
            }
            if by_month.insert(snapshot.month, snapshot).is_some() {
                return Err(ValidationError::DuplicateMonth {
                    month: snapshot.month,
                }
                .into());
            }
        }

        let ordered: Vec<&MonthlySnapshot> = months
            .iter()
            .map(|month| {
                by_month
                    .get(month)
                    .copied()
                    .ok_or(ValidationError::MissingMonth { month: *month })
            })
            .collect::<Result<_, _>>()?;

        for snapshot in &ordered {
            snapshot.validate()?;
        }

        // 2. Canonical roster.
        let (chapter_id, roster) = reconcile(&ordered)?;
        log::debug!(
            "chapter '{chapter_id}': roster of {} members over {} months",
            roster.len(),
            months.len(),
        );

        // 3. Reindex and aggregate both matrices.
        let referral_breakdowns: Vec<MonthBreakdown> = ordered
            .iter()
            .map(|s| MonthBreakdown {
                month: s.month,
                matrix: reindex(&s.referrals, &s.members, &roster, s.month),
            })
            .collect();
        let meeting_breakdowns: Vec<MonthBreakdown> = ordered
            .iter()
            .map(|s| MonthBreakdown {
                month: s.month,
                matrix: reindex(&s.meetings, &s.members, &roster, s.month),
            })
            .collect();

        let referrals = AggregateMatrix::aggregate(&roster, referral_breakdowns);
        let meetings = AggregateMatrix::aggregate(&roster, meeting_breakdowns);

        // 4. Combination codes.
        let combinations = encode_grid(&roster, &referrals, &meetings);

        // 5. Financial aggregates.
        let financials = aggregate_financials(&roster, &ordered, &self.config);

        // 6. Completeness and inactivity.
        let (completeness, inactivity) =
            track_activity(&roster, &months, &referrals, &meetings, &financials);

        // 7. Tiers. months is non-empty here, validated above.
        let final_month = *months.last().ok_or(ValidationError::NoMonthsSelected)?;
        let (averages, classifications) = classify(
            &self.config,
            &roster,
            &referrals,
            &meetings,
            &financials,
            &combinations,
            &completeness,
            final_month,
        );

        // 8. Assembly.
        let mut report = AggregatedReport {
            chapter_id,
            months,
            roster,
            referrals,
            meetings,
            combinations,
            financials,
            completeness,
            inactivity,
            averages,
            classifications,
            tables: Vec::new(),
        };
        report.assemble_tables(&self.config);

        log::info!(
            "aggregated chapter '{}': {} members, {} months, {} tables, {} inactive",
            report.chapter_id,
            report.roster.len(),
            report.months.len(),
            report.tables.len(),
            report.inactivity.len(),
        );

        Ok(report)
    }
}
