//! Typed endpoint dispatch: the single chokepoint between endpoint groups and
//! the wire.
//!
//! Every operation shapes a [`Method`] + path + [`Query`] + optional JSON body
//! and picks the dispatch function matching its declared result shape. The
//! status contract is uniform: 2xx parses per shape, 204 is always an empty
//! result, and anything >= 300 becomes [`Error::Api`] with the verbatim body.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::http;

/// HTTP methods used by the service surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Ordered query-parameter list. Absent values are never added, so presence is
/// decided by explicit `Option` checks rather than truthiness; zero and false
/// still reach the wire when a caller sets them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: &'static str, value: impl Into<String>) {
        self.pairs.push((key, value.into()));
    }

    pub(crate) fn push_opt<T: Display>(&mut self, key: &'static str, value: Option<&T>) {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
    }

    pub(crate) fn push_bool(&mut self, key: &'static str, value: bool) {
        self.pairs.push((key, value.to_string()));
    }

    pub(crate) fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }
}

/// A cohesive set of operations over one resource family.
///
/// Each group declares its primary entity type once; the default-typed fetch
/// helpers below use it, and operations needing another shape call the
/// explicit `call_*` dispatch functions instead.
pub(crate) trait EndpointGroup {
    type Entity: DeserializeOwned;

    fn client(&self) -> &Client;

    fn fetch_one(&self, path: &str, query: &Query) -> Result<Option<Self::Entity>> {
        self.client().call_one(Method::Get, path, query, None)
    }

    fn fetch_list(&self, path: &str, query: &Query) -> Result<Vec<Self::Entity>> {
        self.client().call_list(Method::Get, path, query, None)
    }
}

impl Client {
    /// Perform one authenticated request. `Ok(None)` means the service
    /// answered 204 and there is no body to parse.
    pub(crate) fn send(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Option<ureq::Response>> {
        let url = self.endpoint_url(path);
        let mut request = self
            .agent
            .request(method.as_str(), &url)
            .set("authorization", self.auth_header());
        for (key, value) in query.pairs() {
            request = request.query(key, value);
        }
        let outcome = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        match outcome {
            Ok(response) if response.status() == 204 => Ok(None),
            Ok(response) => Ok(Some(response)),
            Err(ureq::Error::Status(status, response)) => {
                let body = http::read_response_string(response, http::MAX_ERROR_BODY_BYTES)
                    .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
                Err(Error::Api { status, body })
            }
            Err(ureq::Error::Transport(err)) => Err(Error::Http(err.to_string())),
        }
    }

    /// Fire-and-forget call; any response body is discarded.
    pub(crate) fn call_unit(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<()> {
        self.send(method, path, query, body)?;
        Ok(())
    }

    /// Call expecting a single structured record. `None` only when the service
    /// answers 204 or an empty body.
    pub(crate) fn call_one<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Option<T>> {
        match self.read_json(method, path, query, body)? {
            None | Some(Value::Null) => Ok(None),
            Some(payload) => serde_json::from_value(payload)
                .map(Some)
                .map_err(|err| Error::Protocol(format!("{} {path}: {err}", method.as_str()))),
        }
    }

    /// Call expecting a list of structured records. A single-object payload is
    /// accepted as a one-element list; 204 yields an empty list.
    pub(crate) fn call_list<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Vec<T>> {
        let Some(payload) = self.read_json(method, path, query, body)? else {
            return Ok(Vec::new());
        };
        let decode = |value: Value| {
            serde_json::from_value::<T>(value)
                .map_err(|err| Error::Protocol(format!("{} {path}: {err}", method.as_str())))
        };
        match payload {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.into_iter().map(decode).collect(),
            single => Ok(vec![decode(single)?]),
        }
    }

    /// Call returning the response JSON unmodified.
    pub(crate) fn call_raw(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Value> {
        Ok(self
            .read_json(method, path, query, body)?
            .unwrap_or(Value::Null))
    }

    /// Call expecting a plain scalar body (e.g. a count).
    pub(crate) fn call_scalar<T>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(response) = self.send(method, path, query, body)? else {
            return Ok(None);
        };
        let text = http::read_response_string(response, http::MAX_RESPONSE_BYTES)
            .map_err(|err| Error::Protocol(err.to_string()))?;
        let trimmed = text.trim().trim_matches('"');
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse::<T>()
            .map(Some)
            .map_err(|err| Error::Protocol(format!("{} {path}: invalid scalar: {err}", method.as_str())))
    }

    fn read_json(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let Some(response) = self.send(method, path, query, body)? else {
            return Ok(None);
        };
        let text = http::read_response_string(response, http::MAX_RESPONSE_BYTES)
            .map_err(|err| Error::Protocol(err.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| Error::Protocol(format!("{} {path}: {err}", method.as_str())))
    }
}
