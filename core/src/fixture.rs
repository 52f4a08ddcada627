//! Deterministic synthetic chapter generation.
//!
//! Produces realistic multi-month snapshot sets for the demo runner and
//! for tests that want a whole chapter rather than hand-built matrices.
//! Same spec = same snapshots, byte for byte: all randomness flows
//! through seeded FixtureRng streams.

use crate::{
    matrix::Matrix,
    rng::{FixtureRng, FixtureStream},
    snapshot::{FinancialRecord, MonthlySnapshot},
    types::{ChapterId, Member, MonthId},
};

#[derive(Debug, Clone)]
pub struct FixtureSpec {
    pub chapter_id: ChapterId,
    pub seed: u64,
    pub member_count: usize,
    pub start: MonthId,
    pub month_count: usize,
}

impl Default for FixtureSpec {
    fn default() -> Self {
        Self {
            chapter_id: "demo-chapter".into(),
            seed: 42,
            member_count: 12,
            start: MonthId { year: 2025, month: 1 },
            month_count: 3,
        }
    }
}

impl FixtureSpec {
    pub fn months(&self) -> Vec<MonthId> {
        let mut months = Vec::with_capacity(self.month_count);
        let mut month = self.start;
        for _ in 0..self.month_count {
            months.push(month);
            month = month.next();
        }
        months
    }
}

/// Generate one snapshot per month of the spec.
pub fn generate(spec: &FixtureSpec) -> Vec<MonthlySnapshot> {
    let months = spec.months();
    if months.is_empty() {
        return Vec::new();
    }

    let mut names = FixtureRng::new(spec.seed, FixtureStream::Names);
    let roster: Vec<Member> = (0..spec.member_count)
        .map(|i| Member::new(format!("m{:03}", i + 1), full_name(&mut names)))
        .collect();

    // Membership churn: most members span the whole period, a few join
    // late or depart early so rosters genuinely differ across months.
    let mut membership = FixtureRng::new(spec.seed, FixtureStream::Membership);
    let spans: Vec<(usize, usize)> = (0..spec.member_count)
        .map(|_| {
            let last = spec.month_count - 1;
            let joins_late = spec.month_count > 1 && membership.chance(0.15);
            let join = if joins_late {
                1 + membership.next_u64_below(spec.month_count as u64 - 1) as usize
            } else {
                0
            };
            let leaves_early = join < last && membership.chance(0.10);
            let leave = if leaves_early {
                join + membership.next_u64_below((last - join) as u64) as usize
            } else {
                last
            };
            (join, leave)
        })
        .collect();

    let mut referrals = FixtureRng::new(spec.seed, FixtureStream::Referrals);
    let mut meetings = FixtureRng::new(spec.seed, FixtureStream::Meetings);
    let mut financials = FixtureRng::new(spec.seed, FixtureStream::Financials);

    months
        .iter()
        .enumerate()
        .map(|(month_index, &month)| {
            let members: Vec<Member> = roster
                .iter()
                .zip(&spans)
                .filter(|(_, &(join, leave))| join <= month_index && month_index <= leave)
                .map(|(member, _)| member.clone())
                .collect();
            let n = members.len();

            let mut referral_matrix = Matrix::zero(n);
            for i in 0..n {
                for j in 0..n {
                    if i != j && referrals.chance(0.12) {
                        let count = 1 + referrals.next_u64_below(3) as u32;
                        referral_matrix.set(i, j, count);
                    }
                }
            }

            let mut meeting_matrix = Matrix::zero(n);
            for i in 0..n {
                for j in (i + 1)..n {
                    if meetings.chance(0.18) {
                        let count = 1 + meetings.next_u64_below(2) as u32;
                        meeting_matrix.set(i, j, count);
                        meeting_matrix.set(j, i, count);
                    }
                }
            }

            let mut records = Vec::new();
            for member in &members {
                if financials.chance(0.35) {
                    let record_count = 1 + financials.next_u64_below(3);
                    for _ in 0..record_count {
                        let raw = financials.pareto(100.0, 1.5).min(50_000.0);
                        records.push(FinancialRecord {
                            member_id: member.id.clone(),
                            amount: (raw * 100.0).round() / 100.0,
                            is_inside_chapter: financials.chance(0.8),
                        });
                    }
                }
            }

            MonthlySnapshot {
                chapter_id: spec.chapter_id.clone(),
                month,
                members,
                referrals: referral_matrix,
                meetings: meeting_matrix,
                financials: records,
            }
        })
        .collect()
}

fn full_name(rng: &mut FixtureRng) -> String {
    let first = FIRST_NAMES[rng.next_u64_below(FIRST_NAMES.len() as u64) as usize];
    let last = LAST_NAMES[rng.next_u64_below(LAST_NAMES.len() as u64) as usize];
    format!("{first} {last}")
}

const FIRST_NAMES: &[&str] = &[
    "James", "Maria", "Robert", "Linda", "Michael", "Elena", "David", "Susan", "Carlos",
    "Karen", "Thomas", "Nancy", "Daniel", "Priya", "Matthew", "Grace", "Anthony", "Rosa",
    "Mark", "Amy", "Steven", "Diane", "Andrew", "Joan", "Kenneth", "Mei", "Joshua",
    "Paula", "Kevin", "Ruth", "Brian", "Sofia", "George", "Judith", "Edward", "Hannah",
    "Victor", "Alice", "Omar", "Irene",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Nguyen", "Johnson", "Garcia", "Williams", "Chen", "Brown", "Martinez",
    "Jones", "Patel", "Miller", "Kim", "Davis", "Lopez", "Wilson", "Singh", "Anderson",
    "Hernandez", "Taylor", "Ali", "Moore", "Torres", "Jackson", "Rivera", "Martin",
    "Cohen", "Lee", "Flores", "Thompson", "Ramirez", "White", "Silva", "Harris",
    "Costa", "Clark", "Okafor", "Lewis", "Ivanov", "Walker", "Sato",
];
