//! Member reconciliation: one canonical roster per aggregation run.
//!
//! RULE: every matrix in a report shares this ordering. Cell (i, j)
//! means the same member pair in the referral matrix, the meeting
//! matrix, every monthly breakdown, and every combination grid.
//!
//! Ordering: first-seen across months in chronological month order.
//! Members first appearing in the same month are tie-broken
//! lexicographically by id, so repeated runs over the same input
//! produce the same roster.

use crate::{
    error::ValidationError,
    snapshot::MonthlySnapshot,
    types::{ChapterId, Member, MemberId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The unified, stably-ordered member list for one aggregated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, index: usize) -> &Member {
        &self.members[index]
    }

    /// Canonical index of a member id. Linear scan: rosters are tens of
    /// members, and the roster must stay a plain serializable list.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.members.iter().position(|m| m.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &MemberId> {
        self.members.iter().map(|m| &m.id)
    }

    pub fn display_names(&self) -> Vec<String> {
        self.members.iter().map(|m| m.display_name.clone()).collect()
    }
}

/// Build the canonical roster from the union of all snapshots' member sets.
///
/// Fails when the snapshot list is empty or when two snapshots reference
/// different chapters. Returns the common chapter id alongside the roster.
pub fn reconcile(snapshots: &[&MonthlySnapshot]) -> Result<(ChapterId, Roster), ValidationError> {
    let Some(first) = snapshots.first() else {
        return Err(ValidationError::NoSnapshots);
    };
    let chapter_id = first.chapter_id.clone();

    for snapshot in snapshots {
        if snapshot.chapter_id != chapter_id {
            return Err(ValidationError::ChapterMismatch {
                expected: chapter_id,
                found: snapshot.chapter_id.clone(),
                month: snapshot.month,
            });
        }
    }

    let mut by_month: Vec<&MonthlySnapshot> = snapshots.to_vec();
    by_month.sort_by_key(|s| s.month);

    let mut order: Vec<MemberId> = Vec::new();
    let mut names: HashMap<MemberId, String> = HashMap::new();

    for snapshot in by_month {
        let mut newcomers: Vec<&Member> = snapshot
            .members
            .iter()
            .filter(|m| !names.contains_key(&m.id))
            .collect();
        newcomers.sort_by(|a, b| a.id.cmp(&b.id));

        for member in newcomers {
            order.push(member.id.clone());
            names.insert(member.id.clone(), member.display_name.clone());
        }

        // A member may be renamed between months. The roster keeps the
        // most recent display name, identity is the id alone.
        for member in &snapshot.members {
            if let Some(existing) = names.get_mut(&member.id) {
                if *existing != member.display_name {
                    log::debug!(
                        "member {} renamed '{}' -> '{}' in {}",
                        member.id,
                        existing,
                        member.display_name,
                        snapshot.month,
                    );
                    *existing = member.display_name.clone();
                }
            }
        }
    }

    let members = order
        .into_iter()
        .map(|id| {
            let display_name = names.remove(&id).unwrap_or_default();
            Member { id, display_name }
        })
        .collect();

    Ok((chapter_id, Roster { members }))
}
