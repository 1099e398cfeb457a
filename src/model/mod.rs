pub mod subject;
pub mod theme;

pub use subject::{parse_subjects, Subject, SUBJECTS_COLLECTION};
pub use theme::{parse_themes, Theme, THEMES_COLLECTION};

use crate::error::CatalogError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserializes one record, reporting failures against its position in the file.
pub(crate) fn decode_record<T: DeserializeOwned>(
    index: usize,
    record: Value,
) -> Result<T, CatalogError> {
    serde_json::from_value(record).map_err(|e| CatalogError::invalid_record(index, e.to_string()))
}
