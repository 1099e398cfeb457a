use crate::error::{CatalogError, Result};
use crate::model::decode_record;
use crate::model::subject::kind_of;
use crate::store::{validate_document_id, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const THEMES_COLLECTION: &str = "themes";
pub const SUBJECT_REF_FIELD: &str = "subjectId";

/// Sub-topic of exactly one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Document id; a fresh id is generated on import when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub subject_id: String,
    #[serde(flatten)]
    pub extra: Fields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeRecord {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    subject_id: Option<String>,
    #[serde(flatten)]
    extra: Fields,
}

impl Theme {
    pub fn to_fields(&self) -> Fields {
        let mut fields = self.extra.clone();
        if let Some(id) = &self.id {
            fields.insert("id".to_string(), Value::String(id.clone()));
        }
        fields.insert("name".to_string(), Value::String(self.name.clone()));
        fields.insert(
            SUBJECT_REF_FIELD.to_string(),
            Value::String(self.subject_id.clone()),
        );
        fields
    }
}

/// Parses a themes file. Accepted layouts:
///
/// - `[theme, ...]`, each theme carrying `subjectId`
/// - `{ "themes": [theme, ...] }`
/// - `{ "<subjectId>": [theme, ...], ... }`
/// - `[{ "subjectId": "...", "themes": [theme, ...] }, ...]`
///
/// Any array entry holding a `themes` array is a group; its other keys
/// describe the subject and are not imported. An array mixing groups and plain
/// themes is rejected.
///
/// Themes inside a group take the group's subject; naming a different one is
/// an error. Record indexes in errors count across the whole file, in file
/// order.
pub fn parse_themes(text: &str) -> Result<Vec<Theme>> {
    let groups = match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => {
            let group_count = items.iter().filter(|item| is_group(item)).count();
            if group_count == 0 {
                vec![(None, items)]
            } else if group_count == items.len() {
                items.into_iter().map(split_group).collect::<Result<Vec<_>>>()?
            } else {
                return Err(CatalogError::UnsupportedLayout(format!(
                    "array mixes {} theme group(s) with {} plain theme(s)",
                    group_count,
                    items.len() - group_count
                )));
            }
        }
        Value::Object(mut map)
            if map.len() == 1 && map.get("themes").is_some_and(Value::is_array) =>
        {
            match map.remove("themes") {
                Some(Value::Array(items)) => vec![(None, items)],
                _ => Vec::new(),
            }
        }
        Value::Object(map) => map
            .into_iter()
            .map(|(subject_id, items)| match items {
                Value::Array(items) => Ok((Some(subject_id), items)),
                other => Err(CatalogError::UnsupportedLayout(format!(
                    "themes for subject {:?} should be an array, found {}",
                    subject_id,
                    kind_of(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(CatalogError::UnsupportedLayout(format!(
                "expected themes as an array or an object, found {}",
                kind_of(&other)
            )))
        }
    };

    let mut themes = Vec::new();
    for (group_subject, items) in groups {
        for record in items {
            let index = themes.len();
            let record = decode_record(index, record)?;
            themes.push(normalize(index, record, group_subject.as_deref())?);
        }
    }
    Ok(themes)
}

fn is_group(item: &Value) -> bool {
    item.get("themes").is_some_and(Value::is_array)
}

fn split_group(group: Value) -> Result<(Option<String>, Vec<Value>)> {
    let Value::Object(mut group) = group else {
        return Err(CatalogError::UnsupportedLayout("theme group is not an object".to_string()));
    };
    let subject_id = match group.remove(SUBJECT_REF_FIELD) {
        Some(Value::String(id)) => id,
        _ => {
            return Err(CatalogError::UnsupportedLayout(
                "theme group is missing a string \"subjectId\"".to_string(),
            ))
        }
    };
    match group.remove("themes") {
        Some(Value::Array(items)) => Ok((Some(subject_id), items)),
        _ => Ok((Some(subject_id), Vec::new())),
    }
}

fn normalize(index: usize, record: ThemeRecord, group_subject: Option<&str>) -> Result<Theme> {
    let subject_id = match (record.subject_id, group_subject) {
        (Some(own), Some(group)) if own != group => {
            return Err(CatalogError::invalid_record(
                index,
                format!("subjectId {:?} conflicts with its group {:?}", own, group),
            ))
        }
        (Some(own), _) => own,
        (None, Some(group)) => group.to_string(),
        (None, None) => {
            return Err(CatalogError::invalid_record(index, "missing field `subjectId`"));
        }
    };

    if subject_id.trim().is_empty() {
        return Err(CatalogError::invalid_record(index, "empty `subjectId`"));
    }
    if let Some(id) = &record.id {
        validate_document_id(id).map_err(|e| CatalogError::invalid_record(index, e.to_string()))?;
    }

    Ok(Theme {
        id: record.id,
        name: record.name,
        subject_id,
        extra: record.extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subjects_of(themes: &[Theme]) -> Vec<&str> {
        themes.iter().map(|t| t.subject_id.as_str()).collect()
    }

    #[test]
    fn test_parse_flat() {
        let themes = parse_themes(
            r#"[
                {"id": "fractions", "name": "Fractions", "subjectId": "math", "order": 2},
                {"name": "Romans", "subjectId": "history"}
            ]"#,
        )
        .unwrap();
        assert_eq!(subjects_of(&themes), vec!["math", "history"]);
        assert_eq!(themes[0].id.as_deref(), Some("fractions"));
        assert_eq!(themes[0].extra.get("order"), Some(&json!(2)));
        assert_eq!(themes[1].id, None);
    }

    #[test]
    fn test_parse_wrapped() {
        let themes =
            parse_themes(r#"{"themes": [{"name": "Fractions", "subjectId": "math"}]}"#).unwrap();
        assert_eq!(subjects_of(&themes), vec!["math"]);
    }

    #[test]
    fn test_parse_grouped_map() {
        let themes = parse_themes(
            r#"{
                "math": [{"name": "Fractions"}, {"name": "Geometry", "subjectId": "math"}],
                "history": [{"name": "Romans"}]
            }"#,
        )
        .unwrap();
        assert_eq!(subjects_of(&themes), vec!["math", "math", "history"]);
    }

    #[test]
    fn test_grouped_map_indexes_follow_file_order() {
        let err = parse_themes(
            r#"{
                "zoology": [{"name": "Mammals"}],
                "art": [{"name": "Colour"}, {"title": "No name"}]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord { index: 2, .. }));
    }

    #[test]
    fn test_parse_grouped_list() {
        let themes = parse_themes(
            r#"[
                {"subjectId": "math", "themes": [{"name": "Fractions"}, {"name": "Algebra"}]},
                {"subjectId": "art", "themes": []}
            ]"#,
        )
        .unwrap();
        assert_eq!(subjects_of(&themes), vec!["math", "math"]);
    }

    #[test]
    fn test_group_with_subject_metadata() {
        let themes = parse_themes(
            r#"[
                {"subjectId": "math", "name": "Mathematics", "themes": [
                    {"name": "Fractions"},
                    {"name": "Algebra"}
                ]}
            ]"#,
        )
        .unwrap();
        let names: Vec<&str> = themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Fractions", "Algebra"]);
        assert_eq!(subjects_of(&themes), vec!["math", "math"]);
        assert!(themes.iter().all(|t| !t.extra.contains_key("themes")));
    }

    #[test]
    fn test_mixed_groups_and_themes_rejected() {
        let err = parse_themes(
            r#"[
                {"subjectId": "math", "themes": [{"name": "Fractions"}]},
                {"name": "Romans", "subjectId": "history"}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedLayout(_)));
    }

    #[test]
    fn test_group_conflict_rejected() {
        let err = parse_themes(r#"{"math": [{"name": "Romans", "subjectId": "history"}]}"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn test_flat_requires_subject() {
        let err = parse_themes(
            r#"[{"name": "Fractions", "subjectId": "math"}, {"name": "Orphan"}]"#,
        )
        .unwrap_err();
        match err {
            CatalogError::InvalidRecord { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("subjectId"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_group_value_must_be_array() {
        let err = parse_themes(r#"{"math": {"name": "Fractions"}}"#).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedLayout(_)));
    }

    #[test]
    fn test_to_fields() {
        let themes = parse_themes(r#"{"math": [{"name": "Fractions", "level": 3}]}"#).unwrap();
        assert_eq!(
            Value::Object(themes[0].to_fields()),
            json!({ "name": "Fractions", "subjectId": "math", "level": 3 })
        );
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_themes("[]").unwrap().is_empty());
    }
}
