use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use super::RunRecord;

/// Outcome of a single run, including runs that never produced a record.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub strategy: String,
    pub seed: u64,
    pub iteration: usize,
    pub record: Option<RunRecord>,
    pub error: Option<String>,
}

impl RunResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated results for one strategy.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub strategy: String,
    pub runs: usize,
    pub wins: usize,
    pub errors: usize,
    /// Ending key to count, victories included.
    pub outcomes: BTreeMap<String, usize>,
    pub average_days: f64,
    pub average_survivors: f64,
}

impl StrategySummary {
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.wins as f64 / self.runs as f64;
        rate * 100.0
    }
}

#[must_use]
pub fn summarize(results: &[RunResult]) -> Vec<StrategySummary> {
    let mut grouped: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();
    for result in results {
        grouped.entry(result.strategy.as_str()).or_default().push(result);
    }

    grouped
        .into_iter()
        .map(|(strategy, runs)| {
            let records: Vec<&RunRecord> = runs.iter().filter_map(|r| r.record.as_ref()).collect();
            let mut outcomes = BTreeMap::new();
            for record in &records {
                *outcomes.entry(record.outcome.clone()).or_insert(0) += 1;
            }
            let (average_days, average_survivors) = if records.is_empty() {
                (0.0, 0.0)
            } else {
                #[allow(clippy::cast_precision_loss)]
                let count = records.len() as f64;
                let days: u32 = records.iter().map(|r| r.days).sum();
                #[allow(clippy::cast_precision_loss)]
                let survivors = records.iter().map(|r| r.survivors).sum::<usize>() as f64;
                (f64::from(days) / count, survivors / count)
            };
            StrategySummary {
                strategy: strategy.to_string(),
                runs: runs.len(),
                wins: records.iter().filter(|r| r.won).count(),
                errors: runs.iter().filter(|r| !r.passed()).count(),
                outcomes,
                average_days,
                average_survivors,
            }
        })
        .collect()
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[RunResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Journey Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=============================".cyan())?;

    let total_runs = results.len();
    let failed_runs = results.iter().filter(|r| !r.passed()).count();
    writeln!(out, "Total runs: {total_runs}")?;
    writeln!(out, "Completed: {}", (total_runs - failed_runs).to_string().green())?;
    writeln!(out, "Errored: {}", failed_runs.to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for summary in summarize(results) {
        let status = if summary.errors == 0 {
            "✅".green()
        } else {
            "❌".red()
        };
        writeln!(out, "{status} {}", summary.strategy.bold())?;
        writeln!(
            out,
            "   Wins: {}/{} ({:.1}%)",
            summary.wins,
            summary.runs,
            summary.win_rate()
        )?;
        writeln!(out, "   Average days: {:.1}", summary.average_days)?;
        writeln!(out, "   Average survivors: {:.2}", summary.average_survivors)?;
        for (outcome, count) in &summary.outcomes {
            writeln!(out, "   • {outcome}: {count}")?;
        }
        writeln!(out)?;
    }

    let failures: Vec<_> = results.iter().filter(|r| !r.passed()).collect();
    if !failures.is_empty() {
        writeln!(out, "{}", "Errors".bright_red().bold())?;
        for failure in failures {
            writeln!(
                out,
                "  • [{} seed {}] {}",
                failure.strategy,
                failure.seed,
                failure.error.as_deref().unwrap_or_default().red()
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(out: &mut W, results: &[RunResult]) -> Result<()> {
    #[derive(Serialize)]
    struct Report<'a> {
        summaries: Vec<StrategySummary>,
        runs: &'a [RunResult],
    }

    let report = Report {
        summaries: summarize(results),
        runs: results,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[RunResult],
) -> Result<()> {
    writeln!(out, "# Everglades Escape Simulation Results\n")?;

    let total_runs = results.len();
    let failed_runs = results.iter().filter(|r| !r.passed()).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total_runs}")?;
    writeln!(out, "- **Errored**: {failed_runs}\n")?;

    writeln!(out, "| Strategy | Runs | Wins | Win rate | Avg days | Avg survivors |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for summary in summarize(results) {
        writeln!(
            out,
            "| {} | {} | {} | {:.1}% | {:.1} | {:.2} |",
            summary.strategy,
            summary.runs,
            summary.wins,
            summary.win_rate(),
            summary.average_days,
            summary.average_survivors
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Runs\n")?;
    for result in results {
        let status = if result.passed() { "✅" } else { "❌" };
        match (&result.record, &result.error) {
            (Some(record), _) => writeln!(
                out,
                "- {status} `{}` seed {} (iteration {}): {} on day {}",
                result.strategy, result.seed, result.iteration, record.outcome, record.days
            )?,
            (None, error) => writeln!(
                out,
                "- {status} `{}` seed {} (iteration {}): {}",
                result.strategy,
                result.seed,
                result.iteration,
                error.as_deref().unwrap_or("no record")
            )?,
        }
    }
    Ok(())
}
