//! Report rendering for the CLI

use crate::error::GenerationError;
use crate::generator::GenerationReport;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn format_report_json(report: &GenerationReport) -> Result<String, GenerationError> {
    serde_json::to_string_pretty(report).map_err(|e| GenerationError::Render(e.to_string()))
}

pub fn format_report_text(report: &GenerationReport, output_dir: &Path, dry_run: bool) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        "Specs generated".to_string(),
        report.specs_generated.to_string(),
    ]);
    table.add_row(vec![
        "Inherited (skipped)".to_string(),
        report.inherited_skipped.len().to_string(),
    ]);
    table.add_row(vec![
        "Conflicts".to_string(),
        report.conflicts.len().to_string(),
    ]);
    table.add_row(vec![
        "Unresolved requirements".to_string(),
        report.unresolved.len().to_string(),
    ]);
    table.add_row(vec![
        "Duration".to_string(),
        format!("{} ms", report.duration_ms),
    ]);

    let mut out = String::new();
    if dry_run {
        out.push_str(&format!("{}\n", "Dry run: no specs written".yellow()));
    } else {
        out.push_str(&format!(
            "{} {}\n",
            "Specs written to".green(),
            output_dir.display()
        ));
    }
    out.push_str(&table.to_string());

    for conflict in &report.conflicts {
        out.push_str(&format!("\n{} {}", "conflict:".yellow(), conflict));
    }
    for unresolved in &report.unresolved {
        out.push_str(&format!(
            "\n{} {} requires {}",
            "unresolved:".red(),
            unresolved.spec,
            unresolved.capability
        ));
    }
    out
}
