//! Financial aggregation: closed-business value per member, summed
//! across the selected months with derived ratios.
//!
//! Every division here is guarded. A member with no qualifying
//! referrals, or no months with financial data, gets zero ratios,
//! never an error and never NaN.

use crate::{
    config::{AverageDenominator, EngineConfig},
    roster::Roster,
    snapshot::MonthlySnapshot,
    types::{MemberId, MonthId},
};
use serde::{Deserialize, Serialize};

/// One member's closed-business totals within a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthFinancial {
    pub month: MonthId,
    pub inside: f64,
    pub outside: f64,
    pub total: f64,
    pub referral_count: u32,
}

/// One member's financial aggregate over the whole selected period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAggregate {
    pub member_id: MemberId,
    pub total_inside: f64,
    pub total_outside: f64,
    pub total: f64,
    /// Count of qualifying closed-business records.
    pub referral_count: u32,
    /// Months in which this member had at least one financial record.
    pub months_with_activity: u32,
    pub avg_referrals_per_month: f64,
    pub avg_value_per_referral: f64,
    /// Only months with at least one record appear here.
    pub monthly: Vec<MonthFinancial>,
}

/// Sum financial records per member across all selected months.
///
/// `snapshots` must already be filtered to the selected months and
/// sorted chronologically. Output is in roster order.
pub fn aggregate_financials(
    roster: &Roster,
    snapshots: &[&MonthlySnapshot],
    config: &EngineConfig,
) -> Vec<FinancialAggregate> {
    let selected_months = snapshots.len() as u32;

    roster
        .members()
        .iter()
        .map(|member| {
            let mut monthly: Vec<MonthFinancial> = Vec::new();

            for snapshot in snapshots {
                let mut month = MonthFinancial {
                    month: snapshot.month,
                    inside: 0.0,
                    outside: 0.0,
                    total: 0.0,
                    referral_count: 0,
                };
                for record in snapshot
                    .financials
                    .iter()
                    .filter(|r| r.member_id == member.id)
                {
                    if record.is_inside_chapter {
                        month.inside += record.amount;
                    } else {
                        month.outside += record.amount;
                    }
                    month.total += record.amount;
                    month.referral_count += 1;
                }
                if month.referral_count > 0 {
                    monthly.push(month);
                }
            }

            let total_inside: f64 = monthly.iter().map(|m| m.inside).sum();
            let total_outside: f64 = monthly.iter().map(|m| m.outside).sum();
            let total = total_inside + total_outside;
            let referral_count: u32 = monthly.iter().map(|m| m.referral_count).sum();
            let months_with_activity = monthly.len() as u32;

            let denominator = match config.monthly_average_denominator {
                AverageDenominator::MonthsWithActivity => months_with_activity,
                AverageDenominator::MonthsSelected => selected_months,
            };
            let avg_referrals_per_month = if denominator > 0 {
                f64::from(referral_count) / f64::from(denominator)
            } else {
                0.0
            };
            let avg_value_per_referral = if referral_count > 0 {
                total / f64::from(referral_count)
            } else {
                0.0
            };

            FinancialAggregate {
                member_id: member.id.clone(),
                total_inside,
                total_outside,
                total,
                referral_count,
                months_with_activity,
                avg_referrals_per_month,
                avg_value_per_referral,
                monthly,
            }
        })
        .collect()
}
