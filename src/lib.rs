pub mod config;
pub mod error;
pub mod import;
pub mod metrics;
pub mod model;
pub mod purge;
pub mod store;

pub use config::Config;
pub use error::{CatalogError, Result};
pub use import::{import_subjects, import_themes, load_subjects, load_themes, ImportReport};
pub use metrics::{init_logging, init_metrics};
pub use model::{Subject, Theme};
pub use purge::{delete_themes_for_subject, resolve_subject_id, DeleteReport};
pub use store::{DocumentStore, FirestoreClient, MemoryStore};
