use crate::error::Result;
use crate::import::{read_input, ImportReport};
use crate::model::{parse_themes, Theme, THEMES_COLLECTION};
use crate::store::{CollectionRef, DocumentStore, WriteBatch};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub async fn load_themes(path: &Path) -> Result<Vec<Theme>> {
    let text = read_input(path).await?;
    let themes = parse_themes(&text)?;
    tracing::info!(path = %path.display(), count = themes.len(), "Loaded themes");
    Ok(themes)
}

/// Writes each theme to `themes/{id}`, or under a generated id when the
/// record has none.
pub async fn import_themes(
    store: &dyn DocumentStore,
    themes: &[Theme],
    batch_size: usize,
) -> Result<ImportReport> {
    let collection = CollectionRef::new(THEMES_COLLECTION);
    let mut batch = WriteBatch::new();
    let mut per_subject: BTreeMap<&str, usize> = BTreeMap::new();
    let mut seen = HashSet::new();

    for theme in themes {
        let doc = match &theme.id {
            Some(id) => {
                if !seen.insert(id.as_str()) {
                    tracing::warn!(id = %id, "Duplicate theme id in input, last one wins");
                }
                collection.doc(id.as_str())?
            }
            None => collection.new_doc(),
        };
        *per_subject.entry(theme.subject_id.as_str()).or_default() += 1;
        batch.set(doc, theme.to_fields());
    }

    for (subject_id, count) in &per_subject {
        tracing::debug!(subject_id, count, "Queued themes");
    }

    let outcome = batch.commit(store, batch_size).await?;
    tracing::info!(
        collection = THEMES_COLLECTION,
        written = outcome.writes,
        batches = outcome.batches,
        subjects = per_subject.len(),
        "Theme import finished"
    );

    Ok(ImportReport {
        collection: THEMES_COLLECTION.to_string(),
        written: outcome.writes,
        batches: outcome.batches,
    })
}
