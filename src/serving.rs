//! Lightweight client for model-serving nodes (prediction and
//! question-answering), independent of the main CRUD client.

use serde::{Deserialize, Serialize};

use crate::client::normalize_base_url;
use crate::error::{Error, Result};
use crate::http;

/// One record of a prediction or question-answering request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequestRecord {
    /// Optional external identifier echoed back by the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub text: String,
}

impl PredictionRequestRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            key: None,
            text: text.into(),
        }
    }
}

/// Input accepted by [`NodeClient::predict`] and [`NodeClient::get_answers`]:
/// a bare string, one record, or a batch of records. All variants are
/// normalized into the canonical batch form before the request is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictInput {
    Text(String),
    Record(PredictionRequestRecord),
    Batch(Vec<PredictionRequestRecord>),
}

impl PredictInput {
    fn into_records(self) -> Vec<PredictionRequestRecord> {
        match self {
            Self::Text(text) => vec![PredictionRequestRecord::new(text)],
            Self::Record(record) => vec![record],
            Self::Batch(records) => records,
        }
    }
}

impl From<&str> for PredictInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PredictInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<PredictionRequestRecord> for PredictInput {
    fn from(record: PredictionRequestRecord) -> Self {
        Self::Record(record)
    }
}

impl From<Vec<PredictionRequestRecord>> for PredictInput {
    fn from(records: Vec<PredictionRequestRecord>) -> Self {
        Self::Batch(records)
    }
}

/// Options for [`NodeClient::predict`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictOptions {
    /// Request the lightweight non-billing execution path.
    pub test: bool,
    /// Attach per-prediction explanations.
    pub explain: bool,
}

/// Options for [`NodeClient::get_answers`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerOptions {
    /// Request the lightweight non-billing execution path.
    pub test: bool,
    /// Maximum number of answers to return.
    pub top_k: Option<u32>,
}

/// Token-level contribution to a prediction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Explanation {
    pub token: String,
    pub weight: f64,
}

/// One prediction, in input order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub key: Option<String>,
    pub label: String,
    pub score: f64,
    /// Present when explanations were requested.
    #[serde(default)]
    pub explanations: Option<Vec<Explanation>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResponse {
    pub predictions: Vec<Prediction>,
}

/// One extracted answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub score: f64,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerResponse {
    pub answers: Vec<Answer>,
}

/// Blocking client for one model-serving node.
pub struct NodeClient {
    base_url: String,
    agent: ureq::Agent,
}

impl NodeClient {
    /// Point the client at a serving node. No login check is performed; the
    /// node authenticates per request, if at all.
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(url)?,
            agent: http::build_agent(),
        })
    }

    /// Classify the input, returning one prediction per input record.
    pub fn predict(
        &self,
        input: impl Into<PredictInput>,
        options: &PredictOptions,
    ) -> Result<PredictionResponse> {
        let records = input.into().into_records();
        let mut request = self.agent.post(&format!("{}predict", self.base_url));
        if options.test {
            request = request.query("test", "true");
        }
        if options.explain {
            request = request.query("explain", "true");
        }
        self.post_records(request, &records)
    }

    /// Answer the input question(s), returning up to `top_k` answers.
    pub fn get_answers(
        &self,
        input: impl Into<PredictInput>,
        options: &AnswerOptions,
    ) -> Result<AnswerResponse> {
        let records = input.into().into_records();
        let mut request = self.agent.post(&format!("{}answers", self.base_url));
        if options.test {
            request = request.query("test", "true");
        }
        if let Some(top_k) = options.top_k {
            request = request.query("top_k", &top_k.to_string());
        }
        self.post_records(request, &records)
    }

    fn post_records<T: for<'de> Deserialize<'de>>(
        &self,
        request: ureq::Request,
        records: &[PredictionRequestRecord],
    ) -> Result<T> {
        let body = serde_json::to_value(records)
            .map_err(|err| Error::Validation(err.to_string()))?;
        let response = match request.send_json(&body) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = http::read_response_string(response, http::MAX_ERROR_BODY_BYTES)
                    .unwrap_or_default();
                return Err(Error::Api { status, body });
            }
            Err(ureq::Error::Transport(err)) => return Err(Error::Http(err.to_string())),
        };
        let text = http::read_response_string(response, http::MAX_RESPONSE_BYTES)
            .map_err(|err| Error::Protocol(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| Error::Protocol(err.to_string()))
    }
}
