use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::info;
use std::path::Path;
use unical::client::HttpSource;
use unical::config::ConfigStore;
use unical::logging::{LogTarget, init_logging, level_for};
use unical::paths::AppPaths;
use unical::runner::{run_filter, run_upcoming};
use unical::upcoming::ReportWindow;

#[derive(Parser)]
#[command(name = "unical")]
#[command(version, about = "Filter and annotate a subscribed iCalendar feed")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit the feed URL, blocklist and notes interactively
    Configure,
    /// Fetch the feed and write the filtered calendar (default)
    Filter,
    /// List distinct upcoming events without writing anything
    Upcoming {
        /// First day to include (YYYY-MM-DD)
        #[arg(requires = "to")]
        from: Option<String>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(requires = "from")]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = level_for(cli.verbose);

    match cli.command.unwrap_or(Commands::Filter) {
        Commands::Configure => configure(level).await,
        Commands::Filter => {
            let _logger = init_logging(level, LogTarget::Stderr)?;
            let store = ConfigStore::default_location()?;
            let config = store
                .load()
                .with_context(|| format!("failed to load {}", store.path().display()))?;
            let source = HttpSource::new()?;
            let output = AppPaths::output_file(Path::new("."));
            let report = run_filter(&config, &source, &output)
                .await
                .context("filtering failed")?;
            info!(
                "Done: {} events kept, {} dropped, {} annotated",
                report.retained, report.dropped, report.annotated
            );
            Ok(())
        }
        Commands::Upcoming { from, to } => {
            let _logger = init_logging(level, LogTarget::Stderr)?;
            let window = match (from, to) {
                (Some(from), Some(to)) => ReportWindow::from_dates(&from, &to)?,
                _ => ReportWindow::default(),
            };
            let store = ConfigStore::default_location()?;
            let config = store
                .load()
                .with_context(|| format!("failed to load {}", store.path().display()))?;
            let source = HttpSource::new()?;
            let events = run_upcoming(&config, &source, &window, Local::now())
                .await
                .context("fetching upcoming events failed")?;

            if events.is_empty() {
                println!("No upcoming events.");
            }
            for event in &events {
                if let Some(start) = event.start {
                    println!(
                        "{}  {}",
                        start.with_timezone(&Local).format("%a %Y-%m-%d %H:%M"),
                        event.title
                    );
                }
            }
            Ok(())
        }
    }
}

#[cfg(feature = "tui")]
async fn configure(level: &str) -> Result<()> {
    let log_dir = AppPaths::get_log_dir()?;
    let _logger = init_logging(level, LogTarget::File(&log_dir))?;
    let store = ConfigStore::default_location()?;
    let source = HttpSource::new()?;
    unical::tui::run(store, source).await
}

#[cfg(not(feature = "tui"))]
async fn configure(_level: &str) -> Result<()> {
    anyhow::bail!("unical was built without the `tui` feature")
}
