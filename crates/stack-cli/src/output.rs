use stack_core::report::ValidationReport;
use stack_core::types::{Step, StepOutcome};

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Column widths in characters; glyph cells are multi-byte.
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

pub fn outcome_glyph(outcome: Option<StepOutcome>) -> &'static str {
    match outcome {
        Some(StepOutcome::Passed) => "✓",
        Some(StepOutcome::Failed) => "✗",
        Some(StepOutcome::Timeout) => "⏱",
        Some(StepOutcome::Skipped) | None => "-",
    }
}

pub fn validation_rows(report: &ValidationReport) -> Vec<Vec<String>> {
    report
        .results
        .iter()
        .map(|(key, result)| {
            let mut row = vec![key.clone(), result.status.label().to_string()];
            row.extend(
                Step::all()
                    .iter()
                    .map(|step| outcome_glyph(result.step(*step)).to_string()),
            );
            row
        })
        .collect()
}

pub fn print_validation_report(report: &ValidationReport) {
    println!();
    println!("Validation Results");
    print_table(
        &["Repository", "Status", "Build", "Format", "Lint", "Test"],
        validation_rows(report),
    );
    println!();
    println!("Summary: {}", report.summary_line());
}
