use crate::error::Result;
use crate::store::{DocumentRef, DocumentStore, Fields, Write};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub writes: usize,
    pub batches: usize,
}

/// Queue of writes committed in chunks.
///
/// Each chunk is atomic on its own. A failed chunk stops the run; chunks
/// committed before it stay committed.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, doc: DocumentRef, fields: Fields) {
        self.writes.push(Write::Set { doc, fields });
    }

    pub fn delete(&mut self, doc: DocumentRef) {
        self.writes.push(Write::Delete { doc });
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub async fn commit(
        self,
        store: &dyn DocumentStore,
        batch_size: usize,
    ) -> Result<BatchOutcome> {
        let batch_size = batch_size.max(1);
        let total = self.writes.len();
        let mut outcome = BatchOutcome::default();
        let mut pending = self.writes.into_iter().peekable();

        while pending.peek().is_some() {
            let chunk: Vec<Write> = pending.by_ref().take(batch_size).collect();
            let len = chunk.len();
            let deletes = chunk.iter().filter(|w| w.is_delete()).count();

            let started = Instant::now();
            let summary = store.commit(chunk).await?;
            metrics::histogram!("catalog_commit_duration_seconds")
                .record(started.elapsed().as_secs_f64());
            metrics::counter!("catalog_batches_committed_total").increment(1);
            metrics::counter!("catalog_documents_written_total").increment((len - deletes) as u64);
            metrics::counter!("catalog_documents_deleted_total").increment(deletes as u64);

            outcome.writes += len;
            outcome.batches += 1;
            tracing::debug!(
                batch = outcome.batches,
                writes = len,
                committed = outcome.writes,
                total,
                commit_time = ?summary.commit_time,
                "Committed write batch"
            );
        }

        Ok(outcome)
    }
}
