use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use subject_catalog::{Config, FirestoreClient};

/// Delete every theme that belongs to one subject.
#[derive(Parser)]
#[command(name = "delete-themes", version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// Subject whose themes are removed; prompted for when omitted
    subject_id: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    subject_catalog::init_logging(&config.logging.level);
    subject_catalog::init_metrics();

    let subject_id = subject_catalog::resolve_subject_id(
        cli.subject_id,
        std::io::stdin().lock(),
        std::io::stdout(),
    )?;

    let store = FirestoreClient::open(&config.firestore)?;
    let report = subject_catalog::delete_themes_for_subject(
        &store,
        &subject_id,
        config.import.effective_batch_size(),
    )
    .await
    .with_context(|| format!("failed to delete themes of subject {:?}", subject_id))?;

    if report.nothing_found() {
        println!("No themes found for subject \"{}\"", report.subject_id);
    } else {
        println!(
            "Deleted {} theme(s) of subject \"{}\"",
            report.deleted, report.subject_id
        );
    }
    Ok(())
}
