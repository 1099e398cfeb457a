use crate::error::{CatalogError, Result};
use crate::model::decode_record;
use crate::store::{validate_document_id, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUBJECTS_COLLECTION: &str = "subjects";

/// Top-level category. Stored at `subjects/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Subject {
    /// Document body: every field of the record, `id` included.
    pub fn to_fields(&self) -> Fields {
        let mut fields = self.extra.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        fields.insert("name".to_string(), Value::String(self.name.clone()));
        if let Some(description) = &self.description {
            fields.insert("description".to_string(), Value::String(description.clone()));
        }
        fields
    }
}

/// Parses a subjects file: either a bare array or `{ "subjects": [...] }`.
pub fn parse_subjects(text: &str) -> Result<Vec<Subject>> {
    let records = match serde_json::from_str::<Value>(text)? {
        Value::Array(records) => records,
        Value::Object(mut wrapper) => match wrapper.remove("subjects") {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(CatalogError::UnsupportedLayout(
                    "expected an array of subjects or an object with a \"subjects\" array"
                        .to_string(),
                ))
            }
        },
        other => {
            return Err(CatalogError::UnsupportedLayout(format!(
                "expected an array of subjects, found {}",
                kind_of(&other)
            )))
        }
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let subject: Subject = decode_record(index, record)?;
            validate_document_id(&subject.id)
                .map_err(|e| CatalogError::invalid_record(index, e.to_string()))?;
            Ok(subject)
        })
        .collect()
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
