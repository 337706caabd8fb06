use anyhow::Result;
use artrans_backend::bootstrap;
use artrans_backend::cli::{self, ImportArgs};
use artrans_backend::config::ArtransConfig;
use artrans_backend::telemetry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Import Artrans comment exports into an Artalk-style store")]
struct Args {
    /// Directory holding data/artrans.db (defaults to ARTRANS_HOME or the executable's directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import an Artrans JSON file interactively
    Import(ImportArgs),
    /// Run the HTTP server accepting Artrans uploads
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();
    let mut config = match &args.data_dir {
        Some(dir) => ArtransConfig::with_base_dir(dir)?,
        None => ArtransConfig::from_env()?,
    };

    let resources = bootstrap::initialize(&config)?;
    for dir in &resources.directories_created {
        tracing::info!(path = %dir, "created directory");
    }
    let database = resources.database;

    match args.command {
        Command::Import(import) => {
            if let Some(report) =
                tokio::task::spawn_blocking(move || cli::run_import(&database, import)).await??
            {
                tracing::info!(
                    total = report.total,
                    imported = report.imported,
                    skipped = report.skipped.len(),
                    "import finished"
                );
            }
            Ok(())
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                config.api_port = port;
            }
            cli::run_server(config, database).await
        }
    }
}
