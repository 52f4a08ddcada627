//! Report assembly: fixed table order, conditional inactive table,
//! financial sorting, and serializability of the whole report.

use chapter_core::{
    engine::ReportEngine,
    matrix::Matrix,
    report::LogicalTable,
    snapshot::{FinancialRecord, MonthlySnapshot},
    types::{Member, MonthId},
    AggregatedReport,
};

fn month(m: u32) -> MonthId {
    MonthId { year: 2025, month: m }
}

fn record(member_id: &str, amount: f64) -> FinancialRecord {
    FinancialRecord {
        member_id: member_id.into(),
        amount,
        is_inside_chapter: true,
    }
}

fn snapshot(m: u32, ids: &[&str], referrals: Vec<Vec<u32>>, financials: Vec<FinancialRecord>) -> MonthlySnapshot {
    let n = ids.len();
    MonthlySnapshot {
        chapter_id: "alpha".into(),
        month: month(m),
        members: ids.iter().map(|id| Member::new(*id, id.to_uppercase())).collect(),
        referrals: Matrix::from_rows(referrals).expect("square"),
        meetings: Matrix::zero(n),
        financials,
    }
}

fn table_kinds(report: &AggregatedReport) -> Vec<&'static str> {
    report
        .tables
        .iter()
        .map(|table| match table {
            LogicalTable::Summary(_) => "summary",
            LogicalTable::ReferralMatrix(_) => "referral_matrix",
            LogicalTable::MeetingMatrix(_) => "meeting_matrix",
            LogicalTable::CombinationMatrix(_) => "combination_matrix",
            LogicalTable::FinancialReport(_) => "financial_report",
            LogicalTable::InactiveMembers(_) => "inactive_members",
        })
        .collect()
}

/// The table sequence is fixed; the inactive table appears last and
/// only when a member is flagged.
#[test]
fn table_order_is_fixed_with_inactive_last() {
    // b goes silent after January.
    let jan = snapshot(1, &["a", "b"], vec![vec![0, 1], vec![1, 0]], vec![]);
    let feb = snapshot(2, &["a", "c"], vec![vec![0, 1], vec![0, 0]], vec![]);

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan, feb], &[month(1), month(2)])
        .expect("aggregate");

    assert_eq!(
        table_kinds(&report),
        vec![
            "summary",
            "referral_matrix",
            "meeting_matrix",
            "combination_matrix",
            "financial_report",
            "inactive_members",
        ]
    );
}

/// No inactive members: the table is omitted entirely, not emitted
/// empty.
#[test]
fn inactive_table_is_omitted_when_empty() {
    let jan = snapshot(1, &["a", "b"], vec![vec![0, 1], vec![1, 0]], vec![]);

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan], &[month(1)])
        .expect("aggregate");

    assert!(report.inactivity.is_empty());
    assert_eq!(
        table_kinds(&report),
        vec![
            "summary",
            "referral_matrix",
            "meeting_matrix",
            "combination_matrix",
            "financial_report",
        ]
    );
}

/// Financial rows sort by total descending; month sub-tables only
/// carry members with records in that month.
#[test]
fn financial_table_sorts_and_subdivides() {
    let jan = snapshot(
        1,
        &["a", "b", "c"],
        vec![vec![0; 3]; 3],
        vec![record("a", 100.0), record("b", 900.0)],
    );
    let feb = snapshot(
        2,
        &["a", "b", "c"],
        vec![vec![0, 1, 0], vec![0, 0, 0], vec![0, 0, 0]],
        vec![record("c", 400.0)],
    );

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan, feb], &[month(1), month(2)])
        .expect("aggregate");

    let financial = report
        .tables
        .iter()
        .find_map(|table| match table {
            LogicalTable::FinancialReport(t) => Some(t),
            _ => None,
        })
        .expect("financial table present");

    let order: Vec<&str> = financial.rows.iter().map(|r| r.member_id.as_str()).collect();
    assert_eq!(order, vec!["b", "c", "a"], "sorted by total descending");

    assert_eq!(financial.monthly.len(), 2);
    let jan_rows: Vec<&str> = financial.monthly[0]
        .rows
        .iter()
        .map(|r| r.member_id.as_str())
        .collect();
    assert_eq!(jan_rows, vec!["b", "a"], "January had records for b and a only");
    let feb_rows: Vec<&str> = financial.monthly[1]
        .rows
        .iter()
        .map(|r| r.member_id.as_str())
        .collect();
    assert_eq!(feb_rows, vec!["c"]);
}

/// The inactive table reports how many selected months a member has
/// been silent for.
#[test]
fn inactive_rows_count_silent_months() {
    let jan = snapshot(1, &["a", "b"], vec![vec![0, 1], vec![1, 0]], vec![]);
    let feb = snapshot(2, &["a", "c"], vec![vec![0, 1], vec![0, 0]], vec![]);
    let mar = snapshot(3, &["a", "c"], vec![vec![0, 2], vec![0, 0]], vec![]);

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan, feb, mar], &[month(1), month(2), month(3)])
        .expect("aggregate");

    let inactive = report
        .tables
        .iter()
        .find_map(|table| match table {
            LogicalTable::InactiveMembers(t) => Some(t),
            _ => None,
        })
        .expect("inactive table present");

    let b = inactive
        .rows
        .iter()
        .find(|r| r.member_id == "b")
        .expect("b flagged");
    assert_eq!(b.last_active_month, month(1));
    assert_eq!(b.months_silent, 2, "silent through February and March");
}

/// The whole report serializes to JSON and deserializes back to an
/// equal value: both the interactive and export forms feed off one
/// aggregation.
#[test]
fn report_round_trips_through_json() {
    let jan = snapshot(
        1,
        &["a", "b"],
        vec![vec![0, 2], vec![1, 0]],
        vec![record("a", 350.0)],
    );
    let feb = snapshot(2, &["a", "b"], vec![vec![0, 1], vec![0, 0]], vec![]);

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan, feb], &[month(1), month(2)])
        .expect("aggregate");

    let json = serde_json::to_string(&report).expect("serialize");
    let back: AggregatedReport = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(report, back, "JSON round trip must be lossless");
}
