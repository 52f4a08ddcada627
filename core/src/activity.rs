//! Activity tracking: per-member completeness across the selected
//! months, and inactivity flags for members who went silent before the
//! period ended.
//!
//! Both outputs are reporting signals only. They never alter aggregate
//! math: a month with no activity contributes zeros either way.

use crate::{
    financial::FinancialAggregate,
    matrix::AggregateMatrix,
    roster::Roster,
    types::{MemberId, MonthId},
};
use serde::{Deserialize, Serialize};

/// Which of the selected months a member had any recorded activity in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessRecord {
    pub member_id: MemberId,
    pub active_months: Vec<MonthId>,
    pub present_in_all_selected_months: bool,
}

/// Emitted only for members active at some point but silent at the end
/// of the period. Members with zero activity anywhere are a
/// completeness concern, not an inactivity one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityFlag {
    pub member_id: MemberId,
    pub last_active_month: MonthId,
}

/// A member is active in a month when any referral or meeting cell in
/// their row or column is positive that month, or they have any
/// financial record that month.
pub fn track_activity(
    roster: &Roster,
    months: &[MonthId],
    referrals: &AggregateMatrix,
    meetings: &AggregateMatrix,
    financials: &[FinancialAggregate],
) -> (Vec<CompletenessRecord>, Vec<InactivityFlag>) {
    let mut completeness = Vec::with_capacity(roster.len());
    let mut inactivity = Vec::new();

    for (index, member) in roster.members().iter().enumerate() {
        let financial = &financials[index];
        debug_assert_eq!(financial.member_id, member.id);

        let active_months: Vec<MonthId> = months
            .iter()
            .copied()
            .filter(|&month| {
                let in_matrix = [referrals, meetings].into_iter().any(|agg| {
                    agg.month(month).is_some_and(|m| {
                        m.row_sum(index) > 0 || m.col_sum(index) > 0
                    })
                });
                let in_financials = financial.monthly.iter().any(|m| m.month == month);
                in_matrix || in_financials
            })
            .collect();

        let last_active = active_months.last().copied();
        completeness.push(CompletenessRecord {
            member_id: member.id.clone(),
            present_in_all_selected_months: active_months.len() == months.len(),
            active_months,
        });

        if let (Some(last_active_month), Some(&final_month)) = (last_active, months.last()) {
            if last_active_month < final_month {
                inactivity.push(InactivityFlag {
                    member_id: member.id.clone(),
                    last_active_month,
                });
            }
        }
    }

    (completeness, inactivity)
}
