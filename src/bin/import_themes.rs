use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use subject_catalog::{Config, FirestoreClient};

/// Load theme records from a JSON file into the "themes" collection.
#[derive(Parser)]
#[command(name = "import-themes", version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// Themes file, overriding import.themes_path
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    subject_catalog::init_logging(&config.logging.level);
    subject_catalog::init_metrics();

    let path = cli.input.unwrap_or_else(|| config.import.themes_path.clone());
    let themes = subject_catalog::load_themes(&path).await?;

    let store = FirestoreClient::open(&config.firestore)?;
    let report =
        subject_catalog::import_themes(&store, &themes, config.import.effective_batch_size())
            .await?;

    println!("{}", report);
    Ok(())
}
