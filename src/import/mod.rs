pub mod subjects;
pub mod themes;

pub use subjects::{import_subjects, load_subjects};
pub use themes::{import_themes, load_themes};

use crate::error::{CatalogError, Result};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub collection: String,
    pub written: usize,
    pub batches: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {} documents into \"{}\" in {} batch(es)",
            self.written, self.collection, self.batches
        )
    }
}

pub(crate) async fn read_input(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::ReadInput {
            path: path.display().to_string(),
            source,
        })
}
