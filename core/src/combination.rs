//! Combination encoding: the four-state relationship code per member
//! pair, derived from the referral and meeting matrices.
//!
//! The code is derived, never stored: any time the matrices change it
//! is recomputed. Monthly codes are encoded independently from each
//! month's breakdown matrices, an aggregate Both can arise from one
//! month of referrals and a different month of meetings, so monthly
//! codes are not derivable from the aggregate code.

use crate::{
    matrix::{AggregateMatrix, Matrix},
    roster::Roster,
    types::{MemberId, MonthId},
};
use serde::{Deserialize, Serialize};

/// Relationship code for an ordered member pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationCode {
    Neither,
    MeetingOnly,
    ReferralOnly,
    Both,
}

impl CombinationCode {
    pub fn encode(referrals: u32, meetings: u32) -> Self {
        match (referrals > 0, meetings > 0) {
            (true, true) => Self::Both,
            (true, false) => Self::ReferralOnly,
            (false, true) => Self::MeetingOnly,
            (false, false) => Self::Neither,
        }
    }

    /// Compact cell marker for tabular rendering.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Neither => ".",
            Self::MeetingOnly => "M",
            Self::ReferralOnly => "R",
            Self::Both => "B",
        }
    }
}

/// A roster-sized grid of combination codes. Diagonal cells hold None:
/// a member has no relationship code with themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMatrix {
    size: usize,
    cells: Vec<Option<CombinationCode>>,
}

impl CodeMatrix {
    /// Encode a referral/meeting matrix pair over the same roster.
    pub fn encode(referrals: &Matrix, meetings: &Matrix) -> Self {
        debug_assert_eq!(referrals.size(), meetings.size());
        let size = referrals.size();
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                cells.push((row != col).then(|| {
                    CombinationCode::encode(referrals.get(row, col), meetings.get(row, col))
                }));
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<CombinationCode> {
        self.cells[row * self.size + col]
    }

    /// Count each code across the member's row, diagonal excluded.
    pub fn row_counts(&self, row: usize) -> CodeCounts {
        let mut counts = CodeCounts::default();
        for col in 0..self.size {
            match self.get(row, col) {
                Some(CombinationCode::Both) => counts.both += 1,
                Some(CombinationCode::ReferralOnly) => counts.referral_only += 1,
                Some(CombinationCode::MeetingOnly) => counts.meeting_only += 1,
                Some(CombinationCode::Neither) => counts.neither += 1,
                None => {}
            }
        }
        counts
    }
}

/// Four-way code counts for one member's row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeCounts {
    pub both: usize,
    pub referral_only: usize,
    pub meeting_only: usize,
    pub neither: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCodes {
    pub month: MonthId,
    pub codes: CodeMatrix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCodeCounts {
    pub month: MonthId,
    pub counts: CodeCounts,
}

/// Per-member code counts, aggregate and per month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCodeSummary {
    pub member_id: MemberId,
    pub aggregate: CodeCounts,
    pub monthly: Vec<MonthCodeCounts>,
}

/// Aggregate and monthly combination grids plus per-member summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationGrid {
    pub aggregate: CodeMatrix,
    pub monthly: Vec<MonthCodes>,
    pub summaries: Vec<MemberCodeSummary>,
}

/// Encode the full grid from the aggregated referral and meeting
/// matrices. Both aggregates must carry the same months in the same
/// order, the engine guarantees this by construction.
pub fn encode_grid(
    roster: &Roster,
    referrals: &AggregateMatrix,
    meetings: &AggregateMatrix,
) -> CombinationGrid {
    let aggregate = CodeMatrix::encode(&referrals.total, &meetings.total);

    let monthly: Vec<MonthCodes> = referrals
        .monthly
        .iter()
        .zip(&meetings.monthly)
        .map(|(r, m)| {
            debug_assert_eq!(r.month, m.month);
            MonthCodes {
                month: r.month,
                codes: CodeMatrix::encode(&r.matrix, &m.matrix),
            }
        })
        .collect();

    let summaries = (0..roster.len())
        .map(|row| MemberCodeSummary {
            member_id: roster.member(row).id.clone(),
            aggregate: aggregate.row_counts(row),
            monthly: monthly
                .iter()
                .map(|mc| MonthCodeCounts {
                    month: mc.month,
                    counts: mc.codes.row_counts(row),
                })
                .collect(),
        })
        .collect();

    CombinationGrid {
        aggregate,
        monthly,
        summaries,
    }
}
