use std::path::PathBuf;

use clap::Parser;

mod persist;
mod run;

/// HackTown 2025 event dates collected by default.
const EVENT_DATES: [&str; 5] = [
    "2025-07-30",
    "2025-07-31",
    "2025-08-01",
    "2025-08-02",
    "2025-08-03",
];

#[derive(Debug, Parser)]
#[command(name = "hacktown-cli")]
#[command(about = "Collects HackTown schedule data into per-date JSON artifacts")]
struct Cli {
    /// Directory for per-date event files and summary.json.
    #[arg(long, env = "HACKTOWN_OUTPUT_DIR", default_value = "events")]
    output_dir: PathBuf,

    /// Date to collect (YYYY-MM-DD); repeatable. Defaults to the 2025 event
    /// dates.
    #[arg(long = "date")]
    dates: Vec<String>,

    /// Force the conservative constrained-environment profile.
    #[arg(long, conflicts_with = "no_constrained")]
    constrained: bool,

    /// Force the standard profile even when CI environment variables are set.
    #[arg(long)]
    no_constrained: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    run::execute(&cli).await
}
