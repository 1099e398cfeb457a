use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use subject_catalog::{Config, FirestoreClient};

/// Load subject records from a JSON file into the "subjects" collection.
#[derive(Parser)]
#[command(name = "import-subjects", version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// Subjects file, overriding import.subjects_path
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    subject_catalog::init_logging(&config.logging.level);
    subject_catalog::init_metrics();

    let path = cli.input.unwrap_or_else(|| config.import.subjects_path.clone());
    let subjects = subject_catalog::load_subjects(&path).await?;

    let store = FirestoreClient::open(&config.firestore)?;
    let report =
        subject_catalog::import_subjects(&store, &subjects, config.import.effective_batch_size())
            .await?;

    println!("{}", report);
    Ok(())
}
