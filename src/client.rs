//! Base client: URL normalization, credential header, and the construction-time
//! login check.

use serde_json::Value;

use crate::documents::Documents;
use crate::error::{Error, Result};
use crate::http;
use crate::models::Models;
use crate::projects::Projects;

/// Public endpoint of the hosted service.
pub const DEFAULT_URL: &str = "https://api.labelhub.io";

/// Blocking client for the labeling service.
///
/// Holds only read-only configuration (base URL, credential header, HTTP
/// agent), so shared references can be used from multiple threads; every call
/// is an independent blocking request.
#[derive(Debug)]
pub struct Client {
    base_url: String,
    auth_header: String,
    pub(crate) agent: ureq::Agent,
}

impl Client {
    /// Connect to the service at `url` and verify the token via the
    /// login-status endpoint.
    ///
    /// Fails with [`Error::Auth`] when the service rejects the token and with
    /// [`Error::Protocol`] when the login response carries no identity.
    pub fn new(api_token: &str, url: &str) -> Result<Self> {
        let base_url = normalize_base_url(url)?;
        // The service expects the raw token after `Basic`, without the
        // base64 user:password encoding of RFC 7617.
        let auth_header = format!("Basic {api_token}");
        let client = Self {
            base_url,
            auth_header,
            agent: http::build_agent(),
        };
        client.check_auth()?;
        Ok(client)
    }

    /// Connect to the hosted service at [`DEFAULT_URL`].
    pub fn connect(api_token: &str) -> Result<Self> {
        Self::new(api_token, DEFAULT_URL)
    }

    /// Project operations.
    pub fn projects(&self) -> Projects<'_> {
        Projects::new(self)
    }

    /// Document operations.
    pub fn documents(&self) -> Documents<'_> {
        Documents::new(self)
    }

    /// Model operations.
    pub fn models(&self) -> Models<'_> {
        Models::new(self)
    }

    /// Normalized base URL, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn auth_header(&self) -> &str {
        &self.auth_header
    }

    pub(crate) fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn check_auth(&self) -> Result<()> {
        let response = match self
            .agent
            .get(&self.endpoint_url("login/status"))
            .set("authorization", &self.auth_header)
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => {
                return Err(Error::Auth(format!("login check failed: status {status}")));
            }
            Err(ureq::Error::Transport(err)) => return Err(Error::Http(err.to_string())),
        };
        let payload: Value = response
            .into_json()
            .map_err(|err| Error::Protocol(format!("invalid login response: {err}")))?;
        let user = payload
            .get("displayName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .or_else(|| payload.get("email").and_then(Value::as_str))
            .ok_or_else(|| {
                Error::Protocol("login response is missing displayName/email".to_string())
            })?;
        tracing::info!(user, "logged in");
        Ok(())
    }
}

/// Normalize a caller-provided base URL.
///
/// Trailing slashes are stripped and a single one re-added. Any
/// `http(s)://host` is rewritten to `https://host/` unless the host is
/// localhost over plain http; scheme-less input is kept as-is.
pub(crate) fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("base URL must not be empty".to_string()));
    }
    let lowered = trimmed.to_ascii_lowercase();
    let is_local = lowered.starts_with("http://localhost");
    if !is_local && (lowered.starts_with("http://") || lowered.starts_with("https://")) {
        let (_, host) = trimmed
            .split_once("://")
            .ok_or_else(|| Error::Config(format!("unusable base URL: {url}")))?;
        Ok(format!("https://{host}/"))
    } else {
        Ok(format!("{trimmed}/"))
    }
}
