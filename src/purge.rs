//! Bulk removal of the themes that reference one subject.

use crate::error::{CatalogError, Result};
use crate::model::theme::SUBJECT_REF_FIELD;
use crate::model::THEMES_COLLECTION;
use crate::store::{CollectionRef, DocumentStore, FieldFilter, WriteBatch};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub subject_id: String,
    pub matched: usize,
    pub deleted: usize,
    pub batches: usize,
}

impl DeleteReport {
    pub fn nothing_found(&self) -> bool {
        self.matched == 0
    }
}

/// Returns the subject id from the command line, or asks for it on `output`
/// and reads one line from `input`.
pub fn resolve_subject_id<R, W>(arg: Option<String>, mut input: R, mut output: W) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    if let Some(arg) = arg {
        let arg = arg.trim();
        if arg.is_empty() {
            return Err(CatalogError::MissingSubjectId);
        }
        return Ok(arg.to_string());
    }

    write!(output, "Subject ID: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let subject_id = line.trim();
    if subject_id.is_empty() {
        return Err(CatalogError::MissingSubjectId);
    }
    Ok(subject_id.to_string())
}

/// Deletes every theme whose `subjectId` equals `subject_id`.
///
/// Other themes are never touched. When nothing matches, no commit is issued
/// and the report says so; a failed query surfaces as an error instead.
pub async fn delete_themes_for_subject(
    store: &dyn DocumentStore,
    subject_id: &str,
    batch_size: usize,
) -> Result<DeleteReport> {
    let themes = CollectionRef::new(THEMES_COLLECTION);
    let filter = FieldFilter::equal(SUBJECT_REF_FIELD, subject_id);

    let matches = store.query(&themes, &filter).await?;
    tracing::info!(subject_id, matched = matches.len(), "Found themes to delete");

    let mut batch = WriteBatch::new();
    for doc in &matches {
        tracing::debug!(theme = %doc.reference, "Queued delete");
        batch.delete(doc.reference.clone());
    }

    let outcome = batch.commit(store, batch_size).await?;
    if outcome.writes > 0 {
        tracing::info!(
            subject_id,
            deleted = outcome.writes,
            batches = outcome.batches,
            "Deleted themes"
        );
    }

    Ok(DeleteReport {
        subject_id: subject_id.to_string(),
        matched: matches.len(),
        deleted: outcome.writes,
        batches: outcome.batches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_argument_wins_over_prompt() {
        let mut output = Vec::new();
        let id =
            resolve_subject_id(Some(" math ".to_string()), Cursor::new("history\n"), &mut output)
                .unwrap();
        assert_eq!(id, "math");
        assert!(output.is_empty());
    }

    #[test]
    fn test_prompt_reads_line() {
        let mut output = Vec::new();
        let id = resolve_subject_id(None, Cursor::new("history\r\n"), &mut output).unwrap();
        assert_eq!(id, "history");
        assert_eq!(String::from_utf8(output).unwrap(), "Subject ID: ");
    }

    #[test]
    fn test_empty_answer_rejected() {
        let result = resolve_subject_id(None, Cursor::new("   \n"), Vec::new());
        assert!(matches!(result, Err(CatalogError::MissingSubjectId)));

        let result = resolve_subject_id(None, Cursor::new(""), Vec::new());
        assert!(matches!(result, Err(CatalogError::MissingSubjectId)));

        let result = resolve_subject_id(Some("  ".to_string()), Cursor::new(""), Vec::new());
        assert!(matches!(result, Err(CatalogError::MissingSubjectId)));
    }
}
