pub fn init_logging(default_level: &str) {
    let default_filter = format!("subject_catalog={},warn", default_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn init_metrics() {
    metrics::describe_counter!(
        "catalog_documents_written_total",
        "Total number of documents created or overwritten"
    );
    metrics::describe_counter!(
        "catalog_documents_deleted_total",
        "Total number of documents deleted"
    );
    metrics::describe_counter!(
        "catalog_batches_committed_total",
        "Total number of committed write batches"
    );
    metrics::describe_histogram!(
        "catalog_commit_duration_seconds",
        "Batch commit duration"
    );
}
