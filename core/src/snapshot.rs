//! Snapshot input model: one month's captured interactions for one
//! chapter, as delivered by the upstream snapshot loader.
//!
//! Snapshots are immutable once captured. The engine never mutates
//! them, it validates their shape and reindexes their matrices.

use crate::{
    error::ValidationError,
    matrix::Matrix,
    types::{ChapterId, Member, MemberId, MonthId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One closed-business record attributed to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub member_id: MemberId,
    pub amount: f64,
    pub is_inside_chapter: bool,
}

/// One month's captured interaction data for a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    pub chapter_id: ChapterId,
    pub month: MonthId,
    /// Members present this month, in the order the capture listed them.
    pub members: Vec<Member>,
    /// Directional: row gave a referral to column.
    pub referrals: Matrix,
    /// Undirected one-to-one meetings, expected symmetric.
    pub meetings: Matrix,
    pub financials: Vec<FinancialRecord>,
}

impl MonthlySnapshot {
    /// Shape validation. The engine refuses malformed snapshots outright
    /// rather than aggregating around them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let malformed = |detail: String| ValidationError::MalformedSnapshot {
            month: self.month,
            detail,
        };

        let n = self.members.len();
        if self.referrals.size() != n {
            return Err(malformed(format!(
                "referral matrix is {}x{} but {n} members are declared",
                self.referrals.size(),
                self.referrals.size(),
            )));
        }
        if self.meetings.size() != n {
            return Err(malformed(format!(
                "meeting matrix is {}x{} but {n} members are declared",
                self.meetings.size(),
                self.meetings.size(),
            )));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for member in &self.members {
            if member.id.is_empty() {
                return Err(malformed("member with empty id".into()));
            }
            if !seen.insert(&member.id) {
                return Err(malformed(format!("duplicate member id '{}'", member.id)));
            }
        }

        for record in &self.financials {
            if !seen.contains(record.member_id.as_str()) {
                return Err(malformed(format!(
                    "financial record for unknown member '{}'",
                    record.member_id,
                )));
            }
            if !record.amount.is_finite() || record.amount < 0.0 {
                return Err(malformed(format!(
                    "financial record for '{}' has invalid amount {}",
                    record.member_id, record.amount,
                )));
            }
        }

        // Asymmetry is an extractor defect, not a reason to lose data.
        // The cells are aggregated exactly as captured.
        if !self.meetings.is_symmetric() {
            log::warn!(
                "{}: meeting matrix for chapter '{}' is not symmetric",
                self.month,
                self.chapter_id,
            );
        }

        Ok(())
    }
}
