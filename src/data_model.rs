//! Wire-level entities exchanged with the labeling service.
//!
//! All entities are value objects; the service issues every identity and is
//! the sole source of truth. The client keeps nothing across calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Task a project (or model) is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    TextClassification,
    MultiLabelTextClassification,
    NamedEntityRecognition,
    QuestionAnswering,
}

/// A labeling workspace with a task type, label taxonomy, and associated
/// documents and models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Server-issued id; empty until the first [`save`](crate::projects::Projects::save).
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub task_type: TaskType,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub current_model_name: Option<String>,
}

impl Project {
    /// Construct a local draft. The id stays empty until the project is saved.
    pub fn new(name: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            task_type,
            labels: Vec::new(),
            current_model_name: None,
        }
    }
}

/// Lightweight projection of a project returned by name search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
}

/// Server-derived label counts for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProjectStatistics {
    pub labeled_count: u64,
    pub total_count: u64,
}

/// A unit of text with labels, predictions, and auxiliary context fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDocument {
    /// Server-generated document id.
    #[serde(default)]
    pub id: String,
    /// Caller-supplied external identifier; not guaranteed unique.
    #[serde(default)]
    pub key: String,
    pub text: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub predicted_labels: Vec<String>,
    #[serde(default)]
    pub false_positives: Vec<String>,
    #[serde(default)]
    pub false_negatives: Vec<String>,
    /// Free-form auxiliary fields attached to the document. Flattened into
    /// top-level columns on export.
    #[serde(default)]
    pub context_data: Map<String, Value>,
}

/// Document projection plus similarity score, returned by similarity search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredDocument {
    #[serde(flatten)]
    pub document: TextDocument,
    pub score: f64,
}

/// Metadata for a trained model version.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub model_name: String,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    /// Training is asynchronous; poll until this turns true.
    #[serde(default)]
    pub is_ready: bool,
    #[serde(default)]
    pub trained_at: Option<String>,
}

/// Settings for a server-side training job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelTrainingRequest {
    pub task_type: TaskType,
    /// Base model to fine-tune from, if any.
    pub from_model: Option<String>,
    pub model_name: String,
    pub max_num_epochs: u32,
}

/// Embedding vector of one document, fetched via bulk vector export.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentVector {
    pub id: String,
    pub vector: Vec<f32>,
}

/// Merge a document's `context_data` mapping into its top-level fields.
///
/// Context values win over same-named top-level fields, matching the export
/// behavior of the service's own tooling.
pub(crate) fn flatten_context(mut row: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::Object(context)) = row.remove("context_data") {
        for (field, value) in context {
            row.insert(field, value);
        }
    }
    row
}
