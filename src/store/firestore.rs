//! Firestore REST client.
//!
//! Covers the two calls the catalog tools need: `documents:runQuery` for an
//! equality query and `documents:commit` for an atomic list of writes.

use crate::config::FirestoreConfig;
use crate::error::{CatalogError, Result};
use crate::store::value::{decode_fields, encode_fields, encode_value};
use crate::store::{
    CollectionRef, CommitSummary, Document, DocumentRef, DocumentStore, FieldFilter, Write,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Auth {
    Bearer(String),
    ApiKey(String),
    Anonymous,
}

#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: Client,
    documents_root: String,
    database_path: String,
    auth: Auth,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RestDocument>,
}

#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<Value>,
    commit_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirestoreClient {
    /// Builds a client for the configured project. No request is made until
    /// the first query or commit.
    pub fn open(config: &FirestoreConfig) -> Result<Self> {
        if config.project_id.trim().is_empty() {
            return Err(CatalogError::ConfigError(
                "firestore.project_id is not set".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let auth = match (&config.access_token, &config.api_key, &config.emulator_host) {
            (Some(token), _, _) => Auth::Bearer(token.clone()),
            // the emulator treats "owner" as an admin credential that bypasses rules
            (None, _, Some(_)) => Auth::Bearer("owner".to_string()),
            (None, Some(key), None) => Auth::ApiKey(key.clone()),
            (None, None, None) => Auth::Anonymous,
        };

        tracing::debug!(
            project = %config.project_id,
            database = %config.database_id,
            emulator = config.emulator_host.is_some(),
            "Opened Firestore client"
        );

        Ok(Self {
            http,
            documents_root: config.documents_root(),
            database_path: config.database_path(),
            auth,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::ApiKey(key) => request.query(&[("key", key)]),
            Auth::Anonymous => request,
        }
    }

    async fn post(&self, action: &str, body: &Value) -> Result<Response> {
        let url = format!("{}:{}", self.documents_root, action);
        let response = self.authorize(self.http.post(&url)).json(body).send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(parse_error(response).await)
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn query(
        &self,
        collection: &CollectionRef,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>> {
        let body = run_query_body(collection, filter);
        let response = self.post("runQuery", &body).await?;
        let items: Vec<RunQueryItem> = response.json().await?;
        let documents = parse_query_items(&self.database_path, items)?;

        tracing::debug!(
            collection = collection.name(),
            field = %filter.field,
            matched = documents.len(),
            "Query finished"
        );
        Ok(documents)
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<CommitSummary> {
        if writes.is_empty() {
            return Ok(CommitSummary::default());
        }

        let body = commit_body(&self.database_path, &writes);
        let response = self.post("commit", &body).await?;
        let committed: CommitResponse = response.json().await?;

        if committed.write_results.len() != writes.len() {
            tracing::warn!(
                sent = writes.len(),
                acknowledged = committed.write_results.len(),
                "Commit acknowledged a different number of writes"
            );
        }

        Ok(CommitSummary {
            writes: writes.len(),
            commit_time: committed
                .commit_time
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc)),
        })
    }
}

fn document_name(database_path: &str, doc: &DocumentRef) -> String {
    format!("{}/documents/{}", database_path, doc.path())
}

fn quote_field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

pub(crate) fn run_query_body(collection: &CollectionRef, filter: &FieldFilter) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection.name() }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": quote_field_path(&filter.field) },
                    "op": "EQUAL",
                    "value": encode_value(&filter.value),
                }
            }
        }
    })
}

pub(crate) fn commit_body(database_path: &str, writes: &[Write]) -> Value {
    let writes: Vec<Value> = writes
        .iter()
        .map(|write| match write {
            Write::Set { doc, fields } => json!({
                "update": {
                    "name": document_name(database_path, doc),
                    "fields": encode_fields(fields),
                }
            }),
            Write::Delete { doc } => json!({ "delete": document_name(database_path, doc) }),
        })
        .collect();
    json!({ "writes": writes })
}

fn parse_query_items(database_path: &str, items: Vec<RunQueryItem>) -> Result<Vec<Document>> {
    let prefix = format!("{}/documents/", database_path);
    items
        .into_iter()
        .filter_map(|item| item.document)
        .map(|doc| {
            let reference = doc
                .name
                .strip_prefix(&prefix)
                .and_then(DocumentRef::from_path)
                .ok_or_else(|| {
                    CatalogError::UnexpectedResponse(format!("document name {}", doc.name))
                })?;
            Ok(Document {
                reference,
                fields: decode_fields(&doc.fields)?,
            })
        })
        .collect()
}

async fn parse_error(response: Response) -> CatalogError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => envelope.error.message,
        Err(_) if text.trim().is_empty() => "empty response body".to_string(),
        Err(_) => text,
    };
    CatalogError::Api { status, message }
}
