use analytics::{Correlation, PerformanceReport, TableRow, display_pct, display_ratio};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::LogFormat;
use core_types::{Metric, MonthlyReturn};
use engine::PerformanceEngine;
use std::path::PathBuf;
use tokio::sync::broadcast;

const MONTH_HEADERS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The main entry point for the fundstats application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    let _guard = configuration::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args, settings).await,
        Commands::Serve => web_server::run_server(settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Fund performance and risk statistics from periodic return series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the configured series once and print the performance report.
    Report(ReportArgs),
    /// Run the HTTP service (allow-list, access check and the live report).
    Serve,
}

#[derive(Args)]
struct ReportArgs {
    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

/// Runs one refresh cycle and prints the result. Ctrl-C abandons the in-flight loads.
async fn handle_report(args: ReportArgs, settings: configuration::Settings) -> anyhow::Result<()> {
    let engine = PerformanceEngine::from_settings(&settings)?;

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        web_server::signal::ctrl_c().await;
        tracing::info!("Interrupted; cancelling the refresh.");
        let _ = shutdown_tx.send(());
    });

    let report = engine.refresh(&mut shutdown_rx).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_degraded() {
        let roles: Vec<String> = report.degraded.iter().map(ToString::to_string).collect();
        eprintln!(
            "WARNING: no source could be loaded for {}; showing the built-in example data instead.",
            roles.join(", ")
        );
    }
    println!("{}", snapshot_table(&report));
    println!("{}", calendar_table(&report.table));
    Ok(())
}

fn metric_text<T>(metric: &Metric<T>, render: impl Fn(&T) -> String) -> String {
    match metric {
        Metric::Ready(value) => render(value),
        Metric::Pending => "pending".to_string(),
        Metric::Unavailable(reason) => format!("n/a ({reason})"),
    }
}

fn snapshot_table(report: &PerformanceReport) -> Table {
    let s = &report.snapshot;
    let month = |m: &MonthlyReturn| format!("{}: {}", m.period, display_pct(m.return_pct));
    let pct = |v: &f64| display_pct(*v);
    let ratio = |v: &f64| display_ratio(*v);
    let correlation = |c: &Correlation| {
        let value = display_ratio(c.value);
        if c.approximate {
            format!("{value} (approximate, {} months)", c.aligned_pairs)
        } else {
            value
        }
    };

    let rows = [
        ("Inception", metric_text(&s.inception_date, ToString::to_string)),
        ("Daily VaR", metric_text(&s.daily_var, pct)),
        ("Monthly VaR", metric_text(&s.monthly_var, pct)),
        ("Best month", metric_text(&s.best_month, month)),
        ("Worst month", metric_text(&s.worst_month, month)),
        ("Since inception", metric_text(&s.since_inception, pct)),
        ("Annualized", metric_text(&s.annualized_return, pct)),
        ("Sharpe ratio", metric_text(&s.sharpe_ratio, ratio)),
        ("Sortino ratio", metric_text(&s.sortino_ratio, ratio)),
        ("Correlation to benchmark", metric_text(&s.correlation, correlation)),
    ];

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Statistic", "Value"]);
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }
    table
}

fn calendar_table(rows: &[TableRow]) -> Table {
    let mut header = vec!["Year"];
    header.extend(MONTH_HEADERS);
    header.push("Total");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    for row in rows {
        let mut cells = vec![row.year.to_string()];
        cells.extend(row.months.iter().map(|cell| cell.clone().unwrap_or_default()));
        cells.push(row.total.clone());
        table.add_row(cells);
    }
    table
}
