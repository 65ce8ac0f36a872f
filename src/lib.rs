//! Blocking, typed client for the LabelHub document-labeling and
//! model-training service.
//!
//! The [`Client`] verifies the token at construction, then exposes one
//! endpoint group per resource family: [`Client::projects`],
//! [`Client::documents`], and [`Client::models`]. Model-serving nodes have
//! their own lightweight [`serving::NodeClient`].
//!
//! ```no_run
//! use labelhub::{Client, data_model::{Project, TaskType}};
//!
//! # fn main() -> labelhub::Result<()> {
//! let client = Client::new("api-token", "http://localhost:4000")?;
//! let mut project = Project::new("unit-test", TaskType::TextClassification);
//! project.labels = vec!["A".into(), "B".into(), "C".into()];
//! let project = client.projects().save(&project, false, false)?;
//! println!("saved as {}", project.id);
//! # Ok(())
//! # }
//! ```

mod batch;
/// Base client construction and authentication.
pub mod client;
/// Wire-level entities.
pub mod data_model;
/// Document operations, filters, and the export frame.
pub mod documents;
mod endpoint;
/// Error taxonomy.
pub mod error;
mod http;
/// Model operations and downloads.
pub mod models;
/// Project operations.
pub mod projects;
/// Clients for model-serving nodes.
pub mod serving;

pub use client::{Client, DEFAULT_URL};
pub use error::{Error, Result};
