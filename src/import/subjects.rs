use crate::error::Result;
use crate::import::{read_input, ImportReport};
use crate::model::{parse_subjects, Subject, SUBJECTS_COLLECTION};
use crate::store::{CollectionRef, DocumentStore, WriteBatch};
use std::collections::HashSet;
use std::path::Path;

pub async fn load_subjects(path: &Path) -> Result<Vec<Subject>> {
    let text = read_input(path).await?;
    let subjects = parse_subjects(&text)?;
    tracing::info!(path = %path.display(), count = subjects.len(), "Loaded subjects");
    Ok(subjects)
}

/// Writes each subject to `subjects/{id}`, replacing any existing document.
/// Running it twice with the same file leaves the collection unchanged.
pub async fn import_subjects(
    store: &dyn DocumentStore,
    subjects: &[Subject],
    batch_size: usize,
) -> Result<ImportReport> {
    let collection = CollectionRef::new(SUBJECTS_COLLECTION);
    let mut batch = WriteBatch::new();
    let mut seen = HashSet::new();

    for subject in subjects {
        if !seen.insert(subject.id.as_str()) {
            tracing::warn!(id = %subject.id, "Duplicate subject id in input, last one wins");
        }
        batch.set(collection.doc(subject.id.as_str())?, subject.to_fields());
    }

    let outcome = batch.commit(store, batch_size).await?;
    tracing::info!(
        collection = SUBJECTS_COLLECTION,
        written = outcome.writes,
        batches = outcome.batches,
        "Subject import finished"
    );

    Ok(ImportReport {
        collection: SUBJECTS_COLLECTION.to_string(),
        written: outcome.writes,
        batches: outcome.batches,
    })
}
