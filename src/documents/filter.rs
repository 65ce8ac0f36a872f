//! Flat document filters and search options.
//!
//! Each recognized filter key is an explicit field; a parameter reaches the
//! wire exactly when it is `Some`, so zero scores and empty strings set on
//! purpose are not dropped.

use crate::endpoint::Query;

/// Filter on a label-bearing field that can also test for field presence.
///
/// `Absent`/`Present` serialize to the service's `"null"`/`"!null"` sentinel
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceFilter {
    /// Match documents carrying this label in the field.
    Label(String),
    /// Match documents where the field is absent.
    Absent,
    /// Match documents where the field is present.
    Present,
}

impl PresenceFilter {
    pub(crate) fn as_query_value(&self) -> &str {
        match self {
            Self::Label(label) => label,
            Self::Absent => "null",
            Self::Present => "!null",
        }
    }
}

/// Flat keyword filters shared by `count` and `search`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    pub topic_id: Option<String>,
    pub keyword: Option<String>,
    /// Annotated-label filter.
    pub by_label: Option<String>,
    /// Caller-supplied document key.
    pub key: Option<String>,
    pub false_positives: Option<PresenceFilter>,
    pub false_negatives: Option<PresenceFilter>,
    pub predicted_label: Option<String>,
    /// Minimal prediction certainty.
    pub prediction_certainty: Option<f64>,
}

impl DocumentFilter {
    /// Filter by caller-supplied key.
    pub fn by_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub(crate) fn apply(&self, query: &mut Query) {
        query.push_opt("topic_id", self.topic_id.as_ref());
        query.push_opt("keyword", self.keyword.as_ref());
        query.push_opt("by_label", self.by_label.as_ref());
        query.push_opt("key", self.key.as_ref());
        if let Some(filter) = &self.false_positives {
            query.push("false_positives", filter.as_query_value());
        }
        if let Some(filter) = &self.false_negatives {
            query.push("false_negatives", filter.as_query_value());
        }
        query.push_opt("predicted_label", self.predicted_label.as_ref());
        query.push_opt("prediction_certainty", self.prediction_certainty.as_ref());
    }
}

/// Options for the general search operation: flat filters, optional similarity
/// anchors, and offset pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub filter: DocumentFilter,
    /// Id of a document to find neighbours of.
    pub similar_to_doc: Option<String>,
    /// Free phrase to find neighbours of.
    pub similar_to_phrase: Option<String>,
    /// Minimal similarity score to cap similarity results.
    pub min_score: Option<f64>,
    /// Number of documents to skip.
    pub skip: u64,
    /// Page size.
    pub take: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            filter: DocumentFilter::default(),
            similar_to_doc: None,
            similar_to_phrase: None,
            min_score: None,
            skip: 0,
            take: 50,
        }
    }
}

impl SearchOptions {
    /// Whether either similarity anchor is set; decides the result shape.
    pub(crate) fn is_similarity(&self) -> bool {
        self.similar_to_doc.is_some() || self.similar_to_phrase.is_some()
    }

    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        self.filter.apply(&mut query);
        query.push_opt("similar_to_doc", self.similar_to_doc.as_ref());
        query.push_opt("similar_to_phrase", self.similar_to_phrase.as_ref());
        query.push_opt("min_score", self.min_score.as_ref());
        query.push("skip", self.skip.to_string());
        query.push("take", self.take.to_string());
        query
    }
}
