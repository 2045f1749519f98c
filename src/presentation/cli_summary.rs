use crate::application::monitoring::PerfReport;
use crate::domain::report::{BatchReport, Report, TableReport};
use colored::*;
use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct BatchRow {
    table: String,
    key: String,
    added: String,
    removed: String,
    #[tabled(rename = "changed cells")]
    changed_cells: String,
    status: String,
}

#[derive(Tabled)]
struct SummaryRow {
    metric: String,
    value: String,
}

#[derive(Tabled)]
struct ChangedRow {
    key: String,
    column: String,
}

/// Print everything the report holds: error, batch list, table detail.
pub fn print_summary(report: &Report) {
    println!();
    println!("{}", "ROWLENS DIFF SUMMARY".bold().cyan());
    if let Some(schema) = &report.schema {
        println!("Schema: {}", schema.blue());
    }
    println!("Report: {}", report.report_id.bright_yellow());
    println!();

    if let Some(error) = &report.error {
        println!("{} {}", "error:".bold().red(), error.red());
        println!();
    }

    if let Some(batch) = &report.batch {
        print_batch(batch);
    }

    if let Some(table) = &report.table {
        print_table(table);
    }

    if report.is_empty() {
        println!("{}", "Nothing to show.".italic());
    }
}

fn opt_count(n: Option<usize>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

fn print_batch(batch: &BatchReport) {
    if batch.lines.is_empty() {
        println!("{}", "No tables listed.".italic());
        return;
    }

    let rows: Vec<BatchRow> = batch
        .lines
        .iter()
        .map(|l| BatchRow {
            table: l.table.bold().to_string(),
            key: l.key_column.clone().unwrap_or_default(),
            added: opt_count(l.added).green().to_string(),
            removed: opt_count(l.removed).red().to_string(),
            changed_cells: opt_count(l.changed_cells).yellow().to_string(),
            status: if l.ok {
                l.status.green().to_string()
            } else {
                l.status.red().to_string()
            },
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=4)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let failed = batch.failed();
    if failed > 0 {
        println!(
            "  {} of {} table(s) failed",
            failed.to_string().bold().red(),
            batch.lines.len()
        );
    }
    println!();
}

fn print_table(report: &TableReport) {
    let s = &report.summary;
    let qualified = match &s.schema {
        Some(schema) => format!("{}.{}", schema, s.table),
        None => s.table.clone(),
    };
    println!("{} (key {})", qualified.bold(), s.key_column.cyan());

    let summary_rows = vec![
        SummaryRow {
            metric: "Added rows".into(),
            value: s.added.to_string().green().to_string(),
        },
        SummaryRow {
            metric: "Removed rows".into(),
            value: s.removed.to_string().red().to_string(),
        },
        SummaryRow {
            metric: "Changed rows".into(),
            value: s.changed_rows.to_string().yellow().to_string(),
        },
        SummaryRow {
            metric: "Changed cells".into(),
            value: s.changed_cells.to_string().bold().to_string(),
        },
    ];

    let summary_table = Table::new(summary_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=1)).with(Alignment::right()))
        .to_string();
    println!("{summary_table}");

    let changed: Vec<ChangedRow> = report
        .differing_lines()
        .map(|l| ChangedRow {
            key: l.key.clone(),
            column: l.column.yellow().to_string(),
        })
        .collect();

    if changed.is_empty() {
        println!("{}", "No changed cells.".italic());
    } else {
        println!("{}", Table::new(changed).with(Style::rounded()));
    }
    println!();
}

// ─── Performance summary ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PerfRow {
    operation: String,
    table: String,
    #[tabled(rename = "rows")]
    rows: String,
    #[tabled(rename = "time (ms)")]
    duration_ms: String,
}

/// Print a performance timing table to stdout.
pub fn print_perf_summary(report: &PerfReport) {
    if report.timings.is_empty() {
        return;
    }

    println!("{}", "PERFORMANCE".bold().cyan());

    let rows: Vec<PerfRow> = report
        .timings
        .iter()
        .map(|t| PerfRow {
            operation: if t.ok {
                t.operation.dimmed().to_string()
            } else {
                t.operation.red().to_string()
            },
            table: t.table.bold().to_string(),
            rows: t.rows.to_string(),
            duration_ms: format_duration(t.duration_ms),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=3)).with(Alignment::right()))
        .to_string();

    println!("{table}");

    println!(
        "  Total: {} row(s) received  ·  {} ms elapsed",
        report.total_rows_received.to_string().bold(),
        format_duration(report.total_ms),
    );
    println!();
}

fn format_duration(ms: u128) -> String {
    if ms >= 1_000 {
        format!("{:.1}s", ms as f64 / 1_000.0).yellow().to_string()
    } else if ms >= 100 {
        ms.to_string().yellow().to_string()
    } else {
        ms.to_string().green().to_string()
    }
}
