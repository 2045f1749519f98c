use anyhow::Result;
use clap::{Parser, Subcommand};
use rowlens::presentation::cli_summary::{print_perf_summary, print_summary};
use rowlens::presentation::writers::{all_writers, write_to_file, writer_for};
use rowlens::{Action, AppConfig, LogLevel};
use std::path::Path;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "rowlens",
    about = "Rowlens: see exactly which cells changed between two copies of a table."
)]
struct Cli {
    #[arg(short, long, default_value = "rowlens.toml")]
    config: String,

    /// Print the terminal summary without writing report files.
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long, default_value = "all")]
    format: String,

    /// Print per-request timings after the summary.
    #[arg(long)]
    timing: bool,

    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare one table.
    Table {
        #[arg(short, long)]
        table: String,
        #[arg(short, long)]
        key: Option<String>,
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Compare every table the backend lists.
    Tables {
        /// Key column shared by all tables (defaults to ID).
        #[arg(short, long)]
        key: Option<String>,
        #[arg(short, long)]
        schema: Option<String>,
        /// Open the detail view of this table after the batch.
        #[arg(long)]
        open: Option<String>,
    },
}

impl Command {
    fn into_action(self) -> (Option<String>, Action) {
        match self {
            Command::Table { table, key, schema } => (schema, Action::Table { table, key }),
            Command::Tables { key, schema, open } => (schema, Action::Tables { key, open }),
        }
    }
}

impl Cli {
    fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else if self.quiet {
            LogLevel::Error
        } else {
            LogLevel::Info
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    rowlens::init_tracing(cli.log_level());

    let cfg = AppConfig::load(&cli.config)?;
    let writers = match cli.format.as_str() {
        "all" => all_writers(),
        fmt => vec![writer_for(fmt).ok_or_else(|| anyhow::anyhow!("Unknown format: {}", fmt))?],
    };
    let (schema, action) = cli.command.into_action();
    let (report, perf) = rowlens::run_with_timing(&cfg, schema.as_deref(), &action).await?;

    print_summary(&report);
    if cli.timing {
        print_perf_summary(&perf);
    }

    if !cli.dry_run {
        let dir = Path::new(&cfg.output.dir);
        for writer in writers {
            let path = write_to_file(&*writer, &report, dir)?;
            println!("Report written to {}", path.display());
        }
    }

    Ok(if report.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
