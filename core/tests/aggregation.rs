//! Matrix reindexing and aggregation: the summation law, zero
//! diagonals, and zero-fill for members absent from a month.

use chapter_core::{
    engine::ReportEngine,
    matrix::Matrix,
    snapshot::MonthlySnapshot,
    types::{Member, MonthId},
};

fn month(m: u32) -> MonthId {
    MonthId { year: 2025, month: m }
}

fn members(ids: &[&str]) -> Vec<Member> {
    ids.iter().map(|id| Member::new(*id, id.to_uppercase())).collect()
}

fn snapshot(m: u32, ids: &[&str], referrals: Vec<Vec<u32>>, meetings: Vec<Vec<u32>>) -> MonthlySnapshot {
    MonthlySnapshot {
        chapter_id: "alpha".into(),
        month: month(m),
        members: members(ids),
        referrals: Matrix::from_rows(referrals).expect("square referral matrix"),
        meetings: Matrix::from_rows(meetings).expect("square meeting matrix"),
        financials: vec![],
    }
}

fn zeros(n: usize) -> Vec<Vec<u32>> {
    vec![vec![0; n]; n]
}

/// Every aggregate cell equals the sum of that cell across all monthly
/// reindexed matrices, even when member sets differ between months.
#[test]
fn aggregate_cell_is_sum_of_monthly_cells() {
    // January: a, b. February: a, b, c with different local ordering.
    let jan = snapshot(
        1,
        &["a", "b"],
        vec![vec![0, 2], vec![1, 0]],
        zeros(2),
    );
    let feb = snapshot(
        2,
        &["c", "a", "b"],
        vec![vec![0, 0, 4], vec![0, 0, 3], vec![0, 0, 0]],
        zeros(3),
    );

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan, feb], &[month(1), month(2)])
        .expect("aggregate");

    let roster = &report.roster;
    let a = roster.position("a").expect("a");
    let b = roster.position("b").expect("b");
    let c = roster.position("c").expect("c");

    // a -> b: 2 in January plus 3 in February.
    assert_eq!(report.referrals.total.get(a, b), 5);
    // c -> b: only February.
    assert_eq!(report.referrals.total.get(c, b), 4);

    // The summation law holds for every cell.
    for row in 0..roster.len() {
        for col in 0..roster.len() {
            let monthly_sum: u32 = report
                .referrals
                .monthly
                .iter()
                .map(|breakdown| breakdown.matrix.get(row, col))
                .sum();
            assert_eq!(
                report.referrals.total.get(row, col),
                monthly_sum,
                "cell ({row}, {col}) diverged from its monthly sum"
            );
        }
    }
}

/// Diagonals stay zero everywhere, even when an upstream extractor
/// delivered a non-zero self-interaction cell.
#[test]
fn diagonals_are_zero_in_every_matrix() {
    let mut bad_rows = zeros(2);
    bad_rows[0][0] = 7; // self-referral, must be dropped
    bad_rows[0][1] = 1;
    let jan = snapshot(1, &["a", "b"], bad_rows, zeros(2));

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan], &[month(1)])
        .expect("aggregate");

    for i in 0..report.roster.len() {
        assert_eq!(report.referrals.total.get(i, i), 0);
        assert_eq!(report.meetings.total.get(i, i), 0);
        for breakdown in &report.referrals.monthly {
            assert_eq!(breakdown.matrix.get(i, i), 0);
        }
    }
    // The off-diagonal cell survives.
    let a = report.roster.position("a").expect("a");
    let b = report.roster.position("b").expect("b");
    assert_eq!(report.referrals.total.get(a, b), 1);
}

/// A member absent from a month gets zero-filled rows and columns in
/// that month's breakdown, not missing cells.
#[test]
fn absent_members_are_zero_filled() {
    let jan = snapshot(1, &["a", "b"], vec![vec![0, 1], vec![0, 0]], zeros(2));
    let feb = snapshot(2, &["a"], zeros(1), zeros(1));

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan, feb], &[month(1), month(2)])
        .expect("aggregate");

    let b = report.roster.position("b").expect("b on roster");
    let feb_matrix = report
        .referrals
        .month(month(2))
        .expect("february breakdown retained");
    for col in 0..report.roster.len() {
        assert_eq!(feb_matrix.get(b, col), 0);
        assert_eq!(feb_matrix.get(col, b), 0);
    }
}

/// given = row sum, received = column sum, unique_given counts
/// distinct strictly-positive row cells.
#[test]
fn member_totals_match_their_definitions() {
    let jan = snapshot(
        1,
        &["a", "b", "c"],
        vec![vec![0, 2, 1], vec![0, 0, 0], vec![5, 0, 0]],
        zeros(3),
    );

    let report = ReportEngine::with_defaults()
        .aggregate(&[jan], &[month(1)])
        .expect("aggregate");

    let a = report.roster.position("a").expect("a");
    let totals = &report.referrals.totals[a];
    assert_eq!(totals.given, 3, "a gave 2 + 1");
    assert_eq!(totals.received, 5, "a received 5 from c");
    assert_eq!(totals.unique_given, 2, "a gave to two distinct members");
}

/// Per-month matrices stay queryable next to the aggregate: no
/// information loss.
#[test]
fn monthly_breakdowns_are_retained_in_order() {
    let jan = snapshot(1, &["a", "b"], vec![vec![0, 1], vec![0, 0]], zeros(2));
    let feb = snapshot(2, &["a", "b"], vec![vec![0, 2], vec![0, 0]], zeros(2));

    let report = ReportEngine::with_defaults()
        .aggregate(&[feb.clone(), jan.clone()], &[month(1), month(2)])
        .expect("aggregate");

    let months: Vec<MonthId> = report.referrals.monthly.iter().map(|b| b.month).collect();
    assert_eq!(months, vec![month(1), month(2)], "chronological order");

    let a = report.roster.position("a").expect("a");
    let b = report.roster.position("b").expect("b");
    assert_eq!(report.referrals.month(month(1)).expect("jan").get(a, b), 1);
    assert_eq!(report.referrals.month(month(2)).expect("feb").get(a, b), 2);
}
