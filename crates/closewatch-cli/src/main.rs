use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use closewatch_core::{
    menu_badge, ClosureNotifier, Config, JsonInventory, PackageInventory, PackageMetadata,
    RefreshReport, RowAnnotator, RowContext, StatusRecord, STYLE_FIXES,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "closewatch")]
#[command(version, about = "Flags installed plugins that were closed in the plugin registry", long_about = None)]
struct Cli {
    /// Config file (defaults to <config_dir>/closewatch/config.toml)
    #[arg(long, global = true, env = "CLOSEWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Installed plugins JSON, overrides the config
    #[arg(long, global = true, env = "CLOSEWATCH_INSTALLED")]
    installed: Option<PathBuf>,

    /// Update-check results JSON, overrides the config
    #[arg(long, global = true, env = "CLOSEWATCH_UPDATE_STATUS")]
    update_status: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Refresh closed statuses if the last check is older than the interval
    Check,
    /// Refresh closed statuses right now
    Refresh,
    /// Show the cached closed plugins
    Status {
        /// Print the admin HTML (rows + menu badge) instead of a summary
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "closewatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let notifier = ClosureNotifier::from_config(&config).context("Failed to set up notifier")?;
    notifier.init();

    match cli.command {
        Commands::Check => {
            let report = notifier
                .scheduler()
                .maybe_refresh()
                .await
                .context("Check failed")?;
            match report {
                Some(report) => print_report(&report),
                None => println!("Closed status is fresh, nothing to do."),
            }
        }
        Commands::Refresh => {
            let report = notifier
                .scheduler()
                .refresh()
                .await
                .context("Refresh failed")?;
            print_report(&report);
        }
        Commands::Status { html } => {
            let record = notifier.status();
            if html {
                print_html(&record, &config);
            } else {
                print_summary(&record);
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    if let Some(path) = &cli.installed {
        config.inventory.installed_path = path.clone();
    }
    if let Some(path) = &cli.update_status {
        config.inventory.update_status_path = path.clone();
    }

    Ok(config)
}

fn print_report(report: &RefreshReport) {
    println!(
        "Checked {} plugins ({} skipped), {} closed.",
        report.probed, report.skipped, report.closed
    );
}

fn print_summary(record: &StatusRecord) {
    match record.last_checked {
        Some(at) => println!(
            "Last checked: {}",
            at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        ),
        None => println!("Never checked."),
    }

    if record.closed.is_empty() {
        println!("No closed plugins.");
        return;
    }

    println!("{} closed plugin(s):", record.closed_count());
    for (id, notice) in &record.closed {
        println!("  {}\n    {}", id, notice.trim());
    }
}

fn print_html(record: &StatusRecord, config: &Config) {
    // Names are nice to have; fall back to the identifier if the inventory is gone
    let installed = JsonInventory::new(&config.inventory.installed_path)
        .list_installed()
        .unwrap_or_default();

    println!("{}", STYLE_FIXES);
    if let Some(badge) = menu_badge(record) {
        println!("{}", badge);
    }

    let annotator = RowAnnotator::from_record(record);
    for id in record.closed.keys() {
        let metadata = installed
            .get(id)
            .cloned()
            .unwrap_or_else(|| PackageMetadata::new(id.as_str()));
        if let Some(row) = annotator.render(id, &metadata, RowContext::default()) {
            println!("{}", row);
        }
    }
}
