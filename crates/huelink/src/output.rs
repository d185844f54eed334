//! Output formatting: table, JSON, plain.
//!
//! Table uses `tabled`, JSON serializes the underlying data via serde,
//! plain emits one line per item for scripting.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use huelink_core::{Device, DispatchOutcome, DispatchResult, RunReport};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

// ── Lights ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Light ID")]
    id: String,
}

pub fn render_lights(format: OutputFormat, devices: &[Device]) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<LightRow> = devices
                .iter()
                .enumerate()
                .map(|(i, d)| LightRow {
                    index: i + 1,
                    id: d.id.clone(),
                })
                .collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(devices),
        OutputFormat::Plain => Ok(devices
            .iter()
            .map(|d| d.id.as_str())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

// ── Dispatch report ──────────────────────────────────────────────────

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Light ID")]
    id: String,
    #[tabled(rename = "Result")]
    outcome: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn outcome_label(outcome: &DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Success => "ok",
        DispatchOutcome::Rejected { .. } => "rejected",
        DispatchOutcome::TransportFailure { .. } => "unreachable",
        DispatchOutcome::NotAttempted => "skipped",
    }
}

fn outcome_detail(outcome: &DispatchOutcome) -> &str {
    match outcome {
        DispatchOutcome::Rejected { reason } | DispatchOutcome::TransportFailure { reason } => {
            reason
        }
        DispatchOutcome::Success | DispatchOutcome::NotAttempted => "",
    }
}

fn colored_label(outcome: &DispatchOutcome, color: bool) -> String {
    let label = outcome_label(outcome);
    if !color {
        return label.to_owned();
    }
    match outcome {
        DispatchOutcome::Success => label.green().to_string(),
        DispatchOutcome::Rejected { .. } | DispatchOutcome::TransportFailure { .. } => {
            label.red().to_string()
        }
        DispatchOutcome::NotAttempted => label.yellow().to_string(),
    }
}

pub fn render_report(
    format: OutputFormat,
    report: &RunReport,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<ResultRow> = report
                .results
                .iter()
                .map(|r: &DispatchResult| ResultRow {
                    id: r.device_id.clone(),
                    outcome: colored_label(&r.outcome, color),
                    detail: outcome_detail(&r.outcome).to_owned(),
                })
                .collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(report),
        OutputFormat::Plain => Ok(report
            .results
            .iter()
            .map(|r| format!("{}\t{}", r.device_id, outcome_label(&r.outcome)))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
