//! report-runner: headless aggregation runner.
//!
//! Usage:
//!   report-runner --seed 12345 --members 15 --months 3
//!   report-runner --input ./snapshots --config engine.json
//!   report-runner --seed 7 --json > report.json

use anyhow::{Context, Result};
use chapter_core::{
    engine::ReportEngine,
    fixture::{generate, FixtureSpec},
    snapshot::MonthlySnapshot,
    types::MonthId,
    AggregatedReport, EngineConfig, EngineError, EngineResult, LogicalTable, ReportRenderer,
};
use std::env;
use std::fmt::Write as _;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let members = parse_arg(&args, "--members", 12usize);
    let month_count = parse_arg(&args, "--months", 3usize);
    let start: MonthId = parse_arg(&args, "--start", MonthId { year: 2025, month: 1 });
    let json_output = args.iter().any(|a| a == "--json");
    let input_dir = str_arg(&args, "--input");
    let config_path = str_arg(&args, "--config");

    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let run_id = uuid::Uuid::new_v4();
    log::info!("run {run_id}: starting aggregation");

    let snapshots = match input_dir {
        Some(dir) => load_snapshots(dir)?,
        None => {
            let spec = FixtureSpec {
                seed,
                member_count: members,
                month_count,
                start,
                ..FixtureSpec::default()
            };
            generate(&spec)
        }
    };

    let mut selected: Vec<MonthId> = snapshots.iter().map(|s| s.month).collect();
    selected.sort();
    selected.dedup();

    let engine = ReportEngine::new(config);
    let report = engine.aggregate(&snapshots, &selected)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let rendered = TextRenderer.render(&report)?;
    print!("{}", String::from_utf8_lossy(&rendered));

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:       {run_id}");
    println!("  chapter:      {}", report.chapter_id);
    println!("  months:       {}", report.months.len());
    println!("  members:      {}", report.roster.len());
    println!("  inactive:     {}", report.inactivity.len());
    println!("  tables:       {}", report.tables.len());
    Ok(())
}

/// Load every *.json file in a directory as one MonthlySnapshot.
fn load_snapshots(dir: &str) -> Result<Vec<MonthlySnapshot>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read snapshot directory {dir}"))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut snapshots = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let snapshot: MonthlySnapshot = serde_json::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        log::debug!("loaded {} ({})", path.display(), snapshot.month);
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}

// ── Text rendering ───────────────────────────────────────────────────────────

/// Plain-text renderer over the logical table sequence. One of the
/// engine's downstream collaborators, living outside the engine.
struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(&self, report: &AggregatedReport) -> EngineResult<Vec<u8>> {
        let mut out = String::new();
        for table in &report.tables {
            let result = match table {
                LogicalTable::Summary(t) => render_summary(&mut out, t),
                LogicalTable::ReferralMatrix(t) => render_matrix(&mut out, "REFERRALS", t),
                LogicalTable::MeetingMatrix(t) => render_matrix(&mut out, "ONE-TO-ONES", t),
                LogicalTable::CombinationMatrix(t) => render_combinations(&mut out, t),
                LogicalTable::FinancialReport(t) => render_financials(&mut out, t),
                LogicalTable::InactiveMembers(t) => render_inactive(&mut out, t),
            };
            result.map_err(|e| EngineError::Render {
                renderer: self.name().into(),
                detail: e.to_string(),
            })?;
        }
        Ok(out.into_bytes())
    }
}

fn tier_mark(tier: chapter_core::classifier::PerformanceTier) -> &'static str {
    use chapter_core::classifier::PerformanceTier::*;
    match tier {
        Excellent => "E",
        Good => "G",
        NeedsAttention => "!",
        Neutral => "-",
    }
}

fn render_summary(
    out: &mut String,
    table: &chapter_core::report::SummaryTable,
) -> std::fmt::Result {
    writeln!(out, "=== SUMMARY: {} ===", table.chapter_id)?;
    let labels: Vec<String> = table.months.iter().map(|m| m.label()).collect();
    writeln!(out, "  months:          {}", labels.join(", "))?;
    writeln!(out, "  members:         {}", table.member_count)?;
    writeln!(out, "  total referrals: {}", table.total_referrals)?;
    writeln!(out, "  total meetings:  {}", table.total_meetings)?;
    writeln!(out, "  total business:  ${:.2}", table.total_financial)?;
    writeln!(
        out,
        "  averages (n={}): ref {:.2} | mtg {:.2} | biz ${:.2} | both {:.2}",
        table.averages.population,
        table.averages.referrals_given,
        table.averages.meetings_given,
        table.averages.financial_total,
        table.averages.both_relationships,
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "  {:<22} {:>4} {:>4} {:>10} {:>5}  flags",
        "member", "ref", "mtg", "business", "both"
    )?;
    for row in &table.rows {
        let mut flags = String::new();
        if row.outside_flag {
            flags.push('O');
        }
        if !row.present_in_all_selected_months {
            flags.push('P');
        }
        writeln!(
            out,
            "  {:<22} {:>3}{} {:>3}{} {:>9.0}{} {:>4}{}  {}",
            row.display_name,
            row.referrals_given.value,
            tier_mark(row.referrals_given.tier),
            row.meetings_given.value,
            tier_mark(row.meetings_given.tier),
            row.financial_total.value,
            tier_mark(row.financial_total.tier),
            row.both_relationships.value,
            tier_mark(row.both_relationships.tier),
            flags,
        )?;
    }
    writeln!(out)?;
    writeln!(out, "  legend:")?;
    for entry in &table.legend {
        writeln!(
            out,
            "    {} {:<16} {}",
            tier_mark(entry.tier),
            entry.label,
            entry.description
        )?;
    }
    writeln!(out, "    O outside-business flag, P not present in all months")?;
    writeln!(out)
}

fn render_grid(
    out: &mut String,
    matrix: &chapter_core::matrix::Matrix,
) -> std::fmt::Result {
    let n = matrix.size();
    write!(out, "       ")?;
    for col in 0..n {
        write!(out, "{:>4}", col + 1)?;
    }
    writeln!(out)?;
    for row in 0..n {
        write!(out, "  {:>4} ", row + 1)?;
        for col in 0..n {
            if row == col {
                write!(out, "{:>4}", ".")?;
            } else {
                write!(out, "{:>4}", matrix.get(row, col))?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_matrix(
    out: &mut String,
    title: &str,
    table: &chapter_core::report::MatrixTable,
) -> std::fmt::Result {
    writeln!(out, "=== {title} (aggregate) ===")?;
    for (i, name) in table.display_names.iter().enumerate() {
        writeln!(out, "  {:>4} {}", i + 1, name)?;
    }
    render_grid(out, &table.aggregate)?;
    writeln!(out)?;
    writeln!(
        out,
        "  {:<22} {:>6} {:>8} {:>7}",
        "member", "given", "received", "unique"
    )?;
    for (totals, name) in table.totals.iter().zip(&table.display_names) {
        writeln!(
            out,
            "  {:<22} {:>6} {:>8} {:>7}",
            name, totals.given, totals.received, totals.unique_given
        )?;
    }
    writeln!(out)?;
    for breakdown in &table.monthly {
        writeln!(out, "--- {title} {} ---", breakdown.month.label())?;
        render_grid(out, &breakdown.matrix)?;
        writeln!(out)?;
    }
    Ok(())
}

fn render_code_grid(
    out: &mut String,
    codes: &chapter_core::combination::CodeMatrix,
) -> std::fmt::Result {
    let n = codes.size();
    write!(out, "       ")?;
    for col in 0..n {
        write!(out, "{:>3}", col + 1)?;
    }
    writeln!(out)?;
    for row in 0..n {
        write!(out, "  {:>4} ", row + 1)?;
        for col in 0..n {
            let mark = codes.get(row, col).map_or(" ", |c| c.symbol());
            write!(out, "{mark:>3}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_combinations(
    out: &mut String,
    table: &chapter_core::report::CombinationTable,
) -> std::fmt::Result {
    writeln!(out, "=== COMBINATIONS (aggregate; B both, R referral-only, M meeting-only) ===")?;
    render_code_grid(out, &table.aggregate)?;
    writeln!(out)?;
    writeln!(
        out,
        "  {:<22} {:>5} {:>5} {:>5} {:>5}",
        "member", "both", "ref", "mtg", "none"
    )?;
    for (summary, name) in table.summaries.iter().zip(&table.display_names) {
        writeln!(
            out,
            "  {:<22} {:>5} {:>5} {:>5} {:>5}",
            name,
            summary.aggregate.both,
            summary.aggregate.referral_only,
            summary.aggregate.meeting_only,
            summary.aggregate.neither,
        )?;
    }
    writeln!(out)?;
    for month in &table.monthly {
        writeln!(out, "--- COMBINATIONS {} ---", month.month.label())?;
        render_code_grid(out, &month.codes)?;
        writeln!(out)?;
    }
    Ok(())
}

fn render_financials(
    out: &mut String,
    table: &chapter_core::report::FinancialTable,
) -> std::fmt::Result {
    writeln!(out, "=== CLOSED BUSINESS ===")?;
    writeln!(
        out,
        "  {:<22} {:>10} {:>10} {:>10} {:>5} {:>8} {:>10}",
        "member", "inside", "outside", "total", "n", "avg/mo", "avg/ref"
    )?;
    for row in &table.rows {
        writeln!(
            out,
            "  {:<22} {:>10.2} {:>10.2} {:>10.2} {:>5} {:>8.2} {:>10.2} {}{}",
            row.display_name,
            row.total_inside,
            row.total_outside,
            row.total,
            row.referral_count,
            row.avg_referrals_per_month,
            row.avg_value_per_referral,
            tier_mark(row.tier),
            if row.outside_flag { " O" } else { "" },
        )?;
    }
    writeln!(out)?;
    for month in &table.monthly {
        writeln!(out, "--- CLOSED BUSINESS {} ---", month.month.label())?;
        for row in &month.rows {
            writeln!(
                out,
                "  {:<22} {:>10.2} {:>10.2} {:>10.2} {:>5}",
                row.display_name, row.inside, row.outside, row.total, row.referral_count,
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_inactive(
    out: &mut String,
    table: &chapter_core::report::InactiveTable,
) -> std::fmt::Result {
    writeln!(out, "=== INACTIVE MEMBERS ===")?;
    for row in &table.rows {
        writeln!(
            out,
            "  {:<22} last active {} ({} months silent)",
            row.display_name,
            row.last_active_month.label(),
            row.months_silent,
        )?;
    }
    writeln!(out)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
