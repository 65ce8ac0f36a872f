//! Models endpoint group: training, batch prediction triggers, and model
//! file downloads.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::client::Client;
use crate::data_model::{ModelInfo, ModelTrainingRequest};
use crate::endpoint::{EndpointGroup, Method, Query};
use crate::error::{Error, Result};
use crate::http;

/// One entry of the model download manifest.
#[derive(Debug, Clone, Deserialize)]
struct FileUrl {
    url: String,
    /// Relative path of the file within the model directory.
    file: String,
}

/// Operations over the model resource family.
pub struct Models<'a> {
    client: &'a Client,
}

impl EndpointGroup for Models<'_> {
    type Entity = ModelInfo;

    fn client(&self) -> &Client {
        self.client
    }
}

impl<'a> Models<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch details of one model by name or id.
    pub fn get_info(&self, project_id: &str, model_name_or_id: &str) -> Result<Option<ModelInfo>> {
        self.fetch_one(
            &format!("projects/{project_id}/models/{model_name_or_id}"),
            &Query::new(),
        )
    }

    /// List every model of the project.
    pub fn get_all(&self, project_id: &str) -> Result<Vec<ModelInfo>> {
        self.fetch_list(&format!("projects/{project_id}/models"), &Query::new())
    }

    /// Delete one model.
    pub fn delete(&self, project_id: &str, model_name_or_id: &str) -> Result<()> {
        self.client.call_unit(
            Method::Delete,
            &format!("projects/{project_id}/models/{model_name_or_id}"),
            &Query::new(),
            None,
        )
    }

    /// Submit a training job. Training runs asynchronously server-side; poll
    /// [`get_all`](Self::get_all) until the new model reports `is_ready`.
    pub fn train(&self, project_id: &str, request: &ModelTrainingRequest) -> Result<()> {
        let body = serde_json::to_value(request)
            .map_err(|err| Error::Validation(format!("unserializable training request: {err}")))?;
        self.client.call_unit(
            Method::Put,
            &format!("projects/{project_id}/models/train"),
            &Query::new(),
            Some(&body),
        )
    }

    /// Trigger server-side batch prediction with the model.
    pub fn apply_predictions(&self, project_id: &str, model_name_or_id: &str) -> Result<()> {
        self.client.call_unit(
            Method::Put,
            &format!("projects/{project_id}/models/{model_name_or_id}/apply-predict"),
            &Query::new(),
            None,
        )
    }

    /// Trigger re-embedding and re-indexing of the project's documents with
    /// the model.
    pub fn apply_embeddings(&self, project_id: &str, model_name_or_id: &str) -> Result<()> {
        self.client.call_unit(
            Method::Put,
            &format!("projects/{project_id}/models/{model_name_or_id}/apply-embeddings"),
            &Query::new(),
            None,
        )
    }

    /// Download every file of a model beneath `target_dir`, preserving the
    /// server-declared relative paths and streaming in fixed-size chunks.
    pub fn download(
        &self,
        project_id: &str,
        model_name_or_id: &str,
        target_dir: &Path,
    ) -> Result<()> {
        let mut query = Query::new();
        query.push("model_name_or_id", model_name_or_id);
        let manifest: Vec<FileUrl> = self.client.call_list(
            Method::Get,
            &format!("projects/{project_id}/models/download-urls"),
            &query,
            None,
        )?;
        for entry in manifest {
            let relative = safe_relative_path(&entry.file)?;
            let dest = target_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            let response = fetch_signed_url(&entry.url)?;
            let mut file = File::create(&dest)?;
            let bytes = http::copy_response_to_writer(response, &mut file)?;
            tracing::info!(file = %entry.file, bytes, "downloaded model file");
        }
        Ok(())
    }

    /// Deprecated single-zip download used by older service versions.
    ///
    /// Fetches auth URL parameters through the legacy handshake, streams the
    /// archive, and (when `unzip` is set) extracts it next to the archive and
    /// removes the zip. Returns the path to the extracted directory or the
    /// archive. Prefer [`download`](Self::download).
    pub fn download_legacy(
        &self,
        project_id: &str,
        model_name_or_id: &str,
        target_dir: &Path,
        unzip: bool,
    ) -> Result<PathBuf> {
        let mut query = Query::new();
        query.push("project_id", project_id);
        query.push("parameter", model_name_or_id);
        let auth_params =
            self.client
                .call_raw(Method::Get, "login/getAuthUrlParams", &query, None)?;
        let Value::Object(auth_params) = auth_params else {
            return Err(Error::Protocol(
                "auth URL parameters response is not an object".into(),
            ));
        };

        let url = self
            .client
            .endpoint_url(&format!("projects/{project_id}/models/{model_name_or_id}/download"));
        let mut request = http::download_agent().get(&url);
        for (key, value) in &auth_params {
            request = request.query(key, &query_value(value));
        }
        request = request.query("file_name", &format!("{model_name_or_id}.zip"));

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = http::read_response_string(response, http::MAX_ERROR_BODY_BYTES)
                    .unwrap_or_default();
                return Err(Error::Api { status, body });
            }
            Err(ureq::Error::Transport(err)) => return Err(Error::Http(err.to_string())),
        };

        fs::create_dir_all(target_dir)?;
        let zip_path = target_dir.join(format!("{model_name_or_id}.zip"));
        let mut file = File::create(&zip_path)?;
        let bytes = http::copy_response_to_writer(response, &mut file)?;
        drop(file);
        tracing::info!(archive = %zip_path.display(), bytes, "downloaded legacy model archive");

        if unzip {
            let model_dir = target_dir.join(model_name_or_id);
            unzip_to_dir(&zip_path, &model_dir)?;
            fs::remove_file(&zip_path)?;
            Ok(model_dir)
        } else {
            Ok(zip_path)
        }
    }
}

/// Fetch a signed download URL with the plain download agent (signed URLs
/// carry their own credentials, so no auth header is attached).
fn fetch_signed_url(url: &str) -> Result<ureq::Response> {
    match http::download_agent().get(url).call() {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, response)) => {
            let body = http::read_response_string(response, http::MAX_ERROR_BODY_BYTES)
                .unwrap_or_default();
            Err(Error::Api { status, body })
        }
        Err(ureq::Error::Transport(err)) => Err(Error::Http(err.to_string())),
    }
}

/// Validate a server-declared file path: relative, with no parent or root
/// components, so it cannot escape the target directory.
fn safe_relative_path(declared: &str) -> Result<&Path> {
    let path = Path::new(declared);
    let is_safe = !declared.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if is_safe {
        Ok(path)
    } else {
        Err(Error::Validation(format!(
            "unsafe file path in download manifest: {declared}"
        )))
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Extract a zip archive into `dest_dir`, skipping entries whose names would
/// escape it.
fn unzip_to_dir(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| Error::Zip(err.to_string()))?;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| Error::Zip(err.to_string()))?;
        let outpath = match entry.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => continue,
        };
        if entry.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
            continue;
        }
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile)?;
    }
    Ok(())
}
