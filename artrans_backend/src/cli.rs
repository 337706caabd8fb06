use crate::api;
use crate::artran::read_records;
use crate::config::{ArtransConfig, ImportTarget};
use crate::console::{AutoConfirm, Operator, TerminalOperator};
use crate::database::Database;
use crate::importer::{ArtransImporter, ImportOutcome, ImportReport};
use crate::progress::ProgressMode;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Artrans JSON file to import
    pub file: PathBuf,
    /// Put every comment under this site instead of the one named in the file
    #[arg(long)]
    pub site_name: Option<String>,
    /// Replace the site URLs; with --site-name also re-roots page keys on it
    #[arg(long)]
    pub site_url: Option<String>,
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
    #[arg(long, value_enum, default_value_t = ProgressMode::Auto)]
    pub progress: ProgressMode,
}

/// Run the HTTP server exposing `POST /import`.
pub async fn run_server(config: ArtransConfig, database: Database) -> Result<()> {
    tracing::info!(port = config.api_port, "starting artrans import HTTP server");
    api::serve_http(config, database).await
}

/// Imports an Artrans file from the terminal. Declining the prompt is a clean exit.
pub fn run_import(database: &Database, args: ImportArgs) -> Result<Option<ImportReport>> {
    let records = read_records(&args.file)?;
    let target = ImportTarget::new(args.site_name, args.site_url);

    let mut operator: Box<dyn Operator> = if args.yes {
        Box::new(AutoConfirm::new(std::io::stdout()))
    } else {
        Box::new(TerminalOperator::stdio())
    };
    let mut progress = args.progress.reporter();

    let mut importer =
        ArtransImporter::new(database, target, operator.as_mut(), progress.as_mut());
    match importer.run(&records)? {
        ImportOutcome::Aborted => {
            println!("Import cancelled, nothing was written.");
            Ok(None)
        }
        ImportOutcome::Completed(report) => {
            for skipped in &report.skipped {
                println!("  skipped {}: {}", skipped.id, skipped.reason);
            }
            Ok(Some(report))
        }
    }
}
