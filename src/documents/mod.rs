//! Documents endpoint group: lookup, filtered search, similarity queries,
//! annotation, bulk import/export, and vector fetch.

mod filter;
mod frame;
mod query;

pub use filter::{DocumentFilter, PresenceFilter, SearchOptions};
pub use frame::Frame;
pub use query::DocumentQuery;

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::batch::{chunk_count, chunks};
use crate::client::Client;
use crate::data_model::{DocumentVector, ScoredDocument, TextDocument, flatten_context};
use crate::endpoint::{EndpointGroup, Method, Query};
use crate::error::{Error, Result};

/// Batch size for vector export requests, bounding request size.
const VECTOR_BATCH_SIZE: usize = 100;
/// Page size used when exporting every document of a project.
const EXPORT_PAGE_SIZE: u64 = 1000;

/// Options for bulk document import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Collision policy for existing keys: update instead of duplicating.
    pub upsert: bool,
    /// Rows per request.
    pub batch_size: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            upsert: false,
            batch_size: 100,
        }
    }
}

/// Result of [`Documents::search`]: plain documents for regular filters,
/// scored documents when a similarity anchor was set.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResults {
    Documents(Vec<TextDocument>),
    Scored(Vec<ScoredDocument>),
}

impl SearchResults {
    pub fn len(&self) -> usize {
        match self {
            Self::Documents(docs) => docs.len(),
            Self::Scored(docs) => docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Plain documents, discarding scores when the results were scored.
    pub fn into_documents(self) -> Vec<TextDocument> {
        match self {
            Self::Documents(docs) => docs,
            Self::Scored(docs) => docs.into_iter().map(|scored| scored.document).collect(),
        }
    }
}

/// Operations over the document resource family.
pub struct Documents<'a> {
    client: &'a Client,
}

impl EndpointGroup for Documents<'_> {
    type Entity = TextDocument;

    fn client(&self) -> &Client {
        self.client
    }
}

impl<'a> Documents<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch one document by its server-generated id.
    pub fn get(&self, project_id: &str, doc_id: &str) -> Result<Option<TextDocument>> {
        self.fetch_one(&format!("projects/{project_id}/doc/{doc_id}"), &Query::new())
    }

    /// Count documents matching the filter.
    pub fn count(&self, project_id: &str, filter: &DocumentFilter) -> Result<u64> {
        let mut query = Query::new();
        filter.apply(&mut query);
        Ok(self
            .client
            .call_scalar(
                Method::Get,
                &format!("projects/{project_id}/doc/count"),
                &query,
                None,
            )?
            .unwrap_or(0))
    }

    /// General filtered, paginated search.
    ///
    /// With a similarity anchor (`similar_to_doc` or `similar_to_phrase`) the
    /// service runs a nearest-neighbour query and each result carries a score.
    pub fn search(&self, project_id: &str, options: &SearchOptions) -> Result<SearchResults> {
        let path = format!("projects/{project_id}/doc/search");
        if options.is_similarity() {
            self.client
                .call_list(Method::Get, &path, &options.to_query(), None)
                .map(SearchResults::Scored)
        } else {
            self.client
                .call_list(Method::Get, &path, &options.to_query(), None)
                .map(SearchResults::Documents)
        }
    }

    /// Documents most similar to `doc_id`. Returns fewer than `take` results
    /// without error when fewer eligible neighbours exist.
    pub fn get_neighbours(
        &self,
        project_id: &str,
        doc_id: &str,
        min_score: f64,
        take: u64,
    ) -> Result<Vec<ScoredDocument>> {
        let options = SearchOptions {
            similar_to_doc: Some(doc_id.to_string()),
            min_score: Some(min_score),
            take,
            ..SearchOptions::default()
        };
        match self.search(project_id, &options)? {
            SearchResults::Scored(docs) => Ok(docs),
            SearchResults::Documents(_) => Err(Error::Protocol(
                "similarity search returned unscored documents".into(),
            )),
        }
    }

    /// Structured search with a composable boolean filter expression.
    pub fn query(&self, project_id: &str, query: &DocumentQuery) -> Result<Vec<TextDocument>> {
        self.client.call_list(
            Method::Post,
            &format!("projects/{project_id}/doc/query"),
            &Query::new(),
            Some(&query.to_wire()),
        )
    }

    /// Overwrite (not merge) the label set on a batch of documents.
    pub fn set_labels(&self, project_id: &str, doc_ids: &[String], labels: &[String]) -> Result<()> {
        let body = serde_json::json!({ "doc_ids": doc_ids, "labels": labels });
        self.client.call_unit(
            Method::Patch,
            &format!("projects/{project_id}/doc/labels"),
            &Query::new(),
            Some(&body),
        )
    }

    /// Fetch embedding vectors for `doc_ids` in batches of 100.
    ///
    /// The service does not guarantee per-batch response order, so results are
    /// re-associated by id and returned in the requested order; ids the
    /// service did not return are skipped.
    pub fn get_vectors(&self, project_id: &str, doc_ids: &[String]) -> Result<Vec<DocumentVector>> {
        #[derive(Deserialize)]
        struct VectorItem {
            id: String,
            vector: Vec<f32>,
        }

        let path = format!("projects/{project_id}/doc/export-vectors");
        let total_batches = chunk_count(doc_ids.len(), VECTOR_BATCH_SIZE);
        let mut by_id: HashMap<String, Vec<f32>> = HashMap::with_capacity(doc_ids.len());
        for (index, batch) in chunks(doc_ids, VECTOR_BATCH_SIZE).enumerate() {
            let body = serde_json::to_value(batch)
                .map_err(|err| Error::Validation(err.to_string()))?;
            let items: Vec<VectorItem> =
                self.client
                    .call_list(Method::Put, &path, &Query::new(), Some(&body))?;
            tracing::debug!(batch = index + 1, total_batches, "fetched vector batch");
            for item in items {
                by_id.insert(item.id, item.vector);
            }
        }
        Ok(doc_ids
            .iter()
            .filter_map(|id| {
                by_id.remove(id).map(|vector| DocumentVector {
                    id: id.clone(),
                    vector,
                })
            })
            .collect())
    }

    /// Bulk-import the rows of `frame` as documents.
    ///
    /// Every row must have a `text` field; a missing `key` column is
    /// synthesized from the row position. Rows are sent in sequential batches
    /// of `options.batch_size`, and the server-assigned ids are returned
    /// concatenated in batch order. A failing batch aborts the operation and
    /// the ids of batches the service already accepted are not returned.
    pub fn add_documents(
        &self,
        project_id: &str,
        frame: &Frame,
        options: &UploadOptions,
    ) -> Result<Vec<String>> {
        if options.batch_size == 0 {
            return Err(Error::Validation("batch size must be non-zero".into()));
        }
        if !frame.has_column("text") {
            return Err(Error::Validation(
                "a column named `text` must be present in the data".into(),
            ));
        }
        let mut rows: Vec<Map<String, Value>> = frame.rows().to_vec();
        if !frame.has_column("key") {
            for (position, row) in rows.iter_mut().enumerate() {
                row.insert("key".to_string(), Value::String(position.to_string()));
            }
        }

        let path = format!("projects/{project_id}/doc");
        let mut upload_query = Query::new();
        upload_query.push_bool("upsert", options.upsert);
        let total_batches = chunk_count(rows.len(), options.batch_size);

        let mut ids = Vec::with_capacity(rows.len());
        for (index, batch) in chunks(&rows, options.batch_size).enumerate() {
            let body = Value::Array(batch.iter().cloned().map(Value::Object).collect());
            let batch_ids: Vec<String> =
                self.client
                    .call_list(Method::Post, &path, &upload_query, Some(&body))?;
            tracing::info!(
                batch = index + 1,
                total_batches,
                documents = batch.len(),
                "uploaded document batch"
            );
            ids.extend(batch_ids);
        }
        Ok(ids)
    }

    /// Soft-delete: documents stay stored but are filtered from default
    /// listings. Reversible server-side.
    pub fn exclude(&self, project_id: &str, doc_ids: &[String]) -> Result<()> {
        let body = serde_json::to_value(doc_ids)
            .map_err(|err| Error::Validation(err.to_string()))?;
        self.client.call_unit(
            Method::Put,
            &format!("projects/{project_id}/doc/excluded"),
            &Query::new(),
            Some(&body),
        )
    }

    /// Hard-delete one document. Irreversible.
    pub fn delete(&self, project_id: &str, doc_id: &str) -> Result<()> {
        self.client.call_unit(
            Method::Delete,
            &format!("projects/{project_id}/doc/{doc_id}"),
            &Query::new(),
            None,
        )
    }

    /// Hard-delete every document in the project. Irreversible.
    pub fn delete_all(&self, project_id: &str) -> Result<()> {
        self.client.call_unit(
            Method::Delete,
            &format!("projects/{project_id}/doc/all"),
            &Query::new(),
            None,
        )
    }

    /// Export every document of the project into a [`Frame`].
    ///
    /// Pages through the search endpoint in windows of 1000 using the total
    /// from [`count`](Self::count), flattens each document's `context_data`
    /// into top-level columns, and indexes the frame by the internal `_i`
    /// sequence field (failing when `_i` is missing or not unique).
    pub fn export_to_frame(&self, project_id: &str) -> Result<Frame> {
        let total = self.count(project_id, &DocumentFilter::default())?;
        let path = format!("projects/{project_id}/doc/search");
        let total_batches = chunk_count(total as usize, EXPORT_PAGE_SIZE as usize);

        let mut frame = Frame::new();
        let mut page_start = 0u64;
        let mut page = 0usize;
        while page_start < total {
            let mut query = Query::new();
            query.push("after", (page_start as i64 - 1).to_string());
            query.push("before", (page_start + EXPORT_PAGE_SIZE).to_string());
            query.push("take", EXPORT_PAGE_SIZE.to_string());
            let docs: Vec<Map<String, Value>> =
                self.client.call_list(Method::Get, &path, &query, None)?;
            page += 1;
            tracing::info!(page, total_batches, documents = docs.len(), "exported page");
            for doc in docs {
                frame.push_row(flatten_context(doc));
            }
            page_start += EXPORT_PAGE_SIZE;
        }
        frame.set_index("_i")?;
        Ok(frame)
    }
}
