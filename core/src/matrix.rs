//! Square interaction matrices: reindexing onto the canonical roster
//! and elementwise aggregation across months.
//!
//! RULE: the diagonal of every matrix the engine exposes is zero.
//! Self-interaction never counts, even if an upstream extractor
//! produced it.

use crate::{
    roster::Roster,
    types::{Member, MemberId, MonthId},
};
use serde::{Deserialize, Serialize};

/// A square count matrix in row-major order. Row = giver, column =
/// receiver for directional metrics; symmetric for undirected ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    size: usize,
    cells: Vec<u32>,
}

impl Matrix {
    pub fn zero(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build from explicit rows. None if the rows are not square.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.size + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row * self.size + col] = value;
    }

    pub fn add(&mut self, row: usize, col: usize, value: u32) {
        self.cells[row * self.size + col] += value;
    }

    /// Sum of the member's row: interactions given.
    pub fn row_sum(&self, row: usize) -> u64 {
        self.cells[row * self.size..(row + 1) * self.size]
            .iter()
            .map(|&v| u64::from(v))
            .sum()
    }

    /// Sum of the member's column: interactions received.
    pub fn col_sum(&self, col: usize) -> u64 {
        (0..self.size).map(|row| u64::from(self.get(row, col))).sum()
    }

    /// Count of distinct counterparties the member gave to.
    pub fn row_positive_count(&self, row: usize) -> usize {
        self.cells[row * self.size..(row + 1) * self.size]
            .iter()
            .filter(|&&v| v > 0)
            .count()
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size)
            .all(|i| (i + 1..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

/// Scatter one snapshot's local matrix onto the canonical roster.
///
/// Cells for members absent from the snapshot are zero-filled. Zero here
/// means "nothing recorded", the completeness tracker is the place that
/// distinguishes absent-from-month from present-but-silent. Non-zero
/// diagonal cells in the input are dropped with a warning.
pub fn reindex(
    local: &Matrix,
    local_members: &[Member],
    roster: &Roster,
    month: MonthId,
) -> Matrix {
    let mut out = Matrix::zero(roster.len());

    let positions: Vec<Option<usize>> = local_members
        .iter()
        .map(|m| roster.position(&m.id))
        .collect();

    for (i, &row_pos) in positions.iter().enumerate() {
        for (j, &col_pos) in positions.iter().enumerate() {
            let value = local.get(i, j);
            if value == 0 {
                continue;
            }
            if i == j {
                log::warn!(
                    "{month}: dropping non-zero diagonal cell for member {} (value {value})",
                    local_members[i].id,
                );
                continue;
            }
            match (row_pos, col_pos) {
                (Some(r), Some(c)) => out.add(r, c, value),
                // Unreachable when the roster is the union of all
                // snapshot member sets; logged rather than silently lost.
                _ => log::warn!(
                    "{month}: cell ({}, {}) references a member missing from the roster",
                    local_members[i].id,
                    local_members[j].id,
                ),
            }
        }
    }

    out
}

/// One month's reindexed matrix, retained alongside the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBreakdown {
    pub month: MonthId,
    pub matrix: Matrix,
}

/// Per-member row/column totals over the aggregate matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTotals {
    pub member_id: MemberId,
    /// Row sum: interactions this member gave.
    pub given: u64,
    /// Column sum: interactions this member received.
    pub received: u64,
    /// Distinct members this member gave to at least once.
    pub unique_given: usize,
}

/// The elementwise sum of each month's reindexed matrix, with every
/// month's matrix retained so per-month detail stays queryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMatrix {
    pub total: Matrix,
    pub monthly: Vec<MonthBreakdown>,
    pub totals: Vec<MemberTotals>,
}

impl AggregateMatrix {
    /// Sum already-reindexed monthly matrices. `monthly` must be in
    /// chronological order and every matrix must be roster-sized.
    pub fn aggregate(roster: &Roster, monthly: Vec<MonthBreakdown>) -> Self {
        let size = roster.len();
        let mut total = Matrix::zero(size);

        for breakdown in &monthly {
            debug_assert_eq!(breakdown.matrix.size(), size);
            for row in 0..size {
                for col in 0..size {
                    let value = breakdown.matrix.get(row, col);
                    if value > 0 {
                        total.add(row, col, value);
                    }
                }
            }
        }

        let totals = (0..size)
            .map(|row| MemberTotals {
                member_id: roster.member(row).id.clone(),
                given: total.row_sum(row),
                received: total.col_sum(row),
                unique_given: total.row_positive_count(row),
            })
            .collect();

        Self { total, monthly, totals }
    }

    pub fn month(&self, month: MonthId) -> Option<&Matrix> {
        self.monthly
            .iter()
            .find(|b| b.month == month)
            .map(|b| &b.matrix)
    }
}
