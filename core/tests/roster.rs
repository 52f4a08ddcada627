//! Member reconciliation: the canonical roster must be a stable,
//! deterministic union of every snapshot's member set.

use chapter_core::{
    matrix::Matrix,
    roster::reconcile,
    snapshot::MonthlySnapshot,
    types::{Member, MonthId},
};

fn month(m: u32) -> MonthId {
    MonthId { year: 2025, month: m }
}

fn zeros(n: usize) -> Matrix {
    Matrix::zero(n)
}

fn snapshot(m: u32, member_pairs: &[(&str, &str)]) -> MonthlySnapshot {
    let members: Vec<Member> = member_pairs
        .iter()
        .map(|(id, name)| Member::new(*id, *name))
        .collect();
    let n = members.len();
    MonthlySnapshot {
        chapter_id: "alpha".into(),
        month: month(m),
        members,
        referrals: zeros(n),
        meetings: zeros(n),
        financials: vec![],
    }
}

/// Members first seen in the same month are ordered lexicographically
/// by id; later joiners append after earlier ones.
#[test]
fn first_seen_order_with_lexicographic_ties() {
    let jan = snapshot(1, &[("m-bo", "Bo"), ("m-al", "Al")]);
    let feb = snapshot(2, &[("m-al", "Al"), ("m-bo", "Bo"), ("m-cy", "Cy")]);

    let refs = vec![&jan, &feb];
    let (_, roster) = reconcile(&refs).expect("reconcile");

    let ids: Vec<&str> = roster.ids().map(String::as_str).collect();
    assert_eq!(
        ids,
        vec!["m-al", "m-bo", "m-cy"],
        "same-month joiners sort by id, later joiners append"
    );
}

/// Snapshot order in the input list must not matter: ordering follows
/// month order, not list order.
#[test]
fn input_list_order_is_irrelevant() {
    let jan = snapshot(1, &[("m-al", "Al")]);
    let feb = snapshot(2, &[("m-al", "Al"), ("m-cy", "Cy")]);

    let forward = vec![&jan, &feb];
    let reversed = vec![&feb, &jan];

    let (_, a) = reconcile(&forward).expect("forward");
    let (_, b) = reconcile(&reversed).expect("reversed");
    assert_eq!(a, b, "roster must not depend on input list order");
}

/// A member who departs mid-period stays on the canonical roster.
#[test]
fn departed_members_stay_on_roster() {
    let jan = snapshot(1, &[("m-al", "Al"), ("m-zz", "Zed")]);
    let feb = snapshot(2, &[("m-al", "Al")]);

    let refs = vec![&jan, &feb];
    let (_, roster) = reconcile(&refs).expect("reconcile");
    assert_eq!(roster.len(), 2);
    assert!(roster.position("m-zz").is_some(), "departed member missing");
}

/// Identity is the id. A rename between months keeps one roster entry
/// carrying the most recent display name.
#[test]
fn rename_keeps_identity_and_latest_name() {
    let jan = snapshot(1, &[("m-al", "Alice Smith")]);
    let feb = snapshot(2, &[("m-al", "Alice Jones")]);

    let refs = vec![&jan, &feb];
    let (_, roster) = reconcile(&refs).expect("reconcile");
    assert_eq!(roster.len(), 1, "rename must not create a second member");
    assert_eq!(roster.member(0).display_name, "Alice Jones");
}

/// Repeated runs over identical input produce identical rosters.
#[test]
fn reconciliation_is_deterministic() {
    let jan = snapshot(1, &[("m-c", "C"), ("m-a", "A"), ("m-b", "B")]);
    let feb = snapshot(2, &[("m-d", "D"), ("m-a", "A")]);

    let refs = vec![&jan, &feb];
    let (_, first) = reconcile(&refs).expect("first run");
    let (_, second) = reconcile(&refs).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn empty_input_is_rejected() {
    let err = reconcile(&[]).expect_err("empty input must fail");
    assert_eq!(
        err,
        chapter_core::ValidationError::NoSnapshots,
        "expected the no-snapshots validation failure"
    );
}

#[test]
fn chapter_mismatch_is_rejected() {
    let jan = snapshot(1, &[("m-al", "Al")]);
    let mut feb = snapshot(2, &[("m-al", "Al")]);
    feb.chapter_id = "beta".into();

    let refs = vec![&jan, &feb];
    let err = reconcile(&refs).expect_err("mixed chapters must fail");
    match err {
        chapter_core::ValidationError::ChapterMismatch { expected, found, .. } => {
            assert_eq!(expected, "alpha");
            assert_eq!(found, "beta");
        }
        other => panic!("expected ChapterMismatch, got {other:?}"),
    }
}
