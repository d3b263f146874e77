use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod filter;
mod fixtures;
mod intent;
mod models;
mod pipeline;
mod planner;
mod report;
mod server;

use crate::config::AiConfig;
use crate::fixtures::{FixtureConfig, Fixtures};

#[derive(Parser)]
#[command(name = "workforce-dashboard")]
#[command(about = "Turns workforce questions into KPI and chart dashboards", long_about = None)]
struct Cli {
    /// Seed for the synthetic employee and time tracking data
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[arg(long, global = true, default_value_t = 75)]
    employee_count: usize,
    /// Trailing window of time entries, in days
    #[arg(long, global = true, default_value_t = 90)]
    days: i64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard HTTP server
    Serve {
        /// Address to listen on (defaults to BIND_ADDR or 127.0.0.1:8000)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Render a dashboard for one query to an HTML file
    Dashboard {
        query: String,
        #[arg(long, default_value = "dashboard.html")]
        out: PathBuf,
    },
    /// Print how a query is interpreted
    Interpret { query: String },
    /// Write the synthetic tables to CSV
    Export {
        #[arg(long, default_value = "employees.csv")]
        employees: PathBuf,
        #[arg(long, default_value = "time_entries.csv")]
        time_entries: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let today = Utc::now().date_naive();
    let fixture_config = FixtureConfig {
        employee_count: cli.employee_count,
        days: cli.days.max(1),
        seed: cli.seed,
    };
    let fixtures = Arc::new(Fixtures::generate(&fixture_config, today));
    tracing::info!(
        employees = fixtures.employees.len(),
        time_entries = fixtures.time_entries.len(),
        "synthetic workforce data ready"
    );

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(config::bind_addr_from_env);
            let state = server::AppState {
                fixtures,
                parser: intent::select_parser(&AiConfig::from_env()),
            };
            server::serve(state, &bind).await?;
        }
        Commands::Dashboard { query, out } => {
            let parser = intent::select_parser(&AiConfig::from_env());
            let response =
                pipeline::generate_dashboard(parser.as_ref(), fixtures, &query, today).await?;
            report::write_document(&out, &response.html)?;
            println!(
                "Interpreted as {}.",
                serde_json::to_string(&response.query_interpretation)?
            );
            println!("Dashboard written to {}.", out.display());
        }
        Commands::Interpret { query } => {
            let parser = intent::select_parser(&AiConfig::from_env());
            let intent = parser.parse(&query).await;
            println!("{}", serde_json::to_string_pretty(&intent)?);
        }
        Commands::Export {
            employees,
            time_entries,
        } => {
            fixtures.export_csv(&employees, &time_entries)?;
            println!(
                "Wrote {} employees to {} and {} time entries to {}.",
                fixtures.employees.len(),
                employees.display(),
                fixtures.time_entries.len(),
                time_entries.display()
            );
        }
    }

    Ok(())
}
