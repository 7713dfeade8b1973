use std::path::PathBuf;

use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookstore", version, about = "Bookstore back-office service")]
struct Cli {
    /// Directory holding the store files, overrides `storage.data_dir`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service until interrupted
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate one sales report now and print it as JSON
    Report {
        /// Directory to archive the report in, overrides `reports.dir`
        #[arg(long)]
        reports_dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load bookstore settings")?;
    if let Some(dir) = cli.data_dir {
        settings.storage.data_dir = dir;
    }
    bookstore_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(bookstore_app::app::run(settings))
        }
        Command::Report { reports_dir } => {
            if let Some(dir) = reports_dir {
                settings.reports.dir = dir;
            }
            let (report, path) = bookstore_app::app::generate_report(&settings)?;
            tracing::info!(path = %path.display(), "report archived");
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
