//! Project endpoint group.

use serde_json::Value;

use crate::client::Client;
use crate::data_model::{Project, ProjectInfo, ProjectStatistics};
use crate::endpoint::{EndpointGroup, Method, Query};
use crate::error::{Error, Result};

/// Operations over the project resource family.
pub struct Projects<'a> {
    client: &'a Client,
}

impl EndpointGroup for Projects<'_> {
    type Entity = Project;

    fn client(&self) -> &Client {
        self.client
    }
}

impl<'a> Projects<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch one project by id. Missing projects surface as [`Error::Api`]
    /// with the service's 404-class status.
    pub fn get(&self, project_id: &str) -> Result<Option<Project>> {
        self.fetch_one(&format!("projects/{project_id}"), &Query::new())
    }

    /// Fetch labeled/total counts for a project.
    pub fn get_stats(&self, project_id: &str) -> Result<ProjectStatistics> {
        let payload = self.client.call_raw(
            Method::Get,
            &format!("projects/{project_id}/status"),
            &Query::new(),
            None,
        )?;
        let stats = payload
            .get("stats")
            .cloned()
            .ok_or_else(|| Error::Protocol("project status response has no `stats` field".into()))?;
        serde_json::from_value(stats)
            .map_err(|err| Error::Protocol(format!("invalid project stats: {err}")))
    }

    /// Create or update a project.
    ///
    /// A draft with an empty id is sent without the id so the service issues
    /// one; the returned project carries it. `regenerate` asks the service to
    /// re-download and reprocess source data, `merge_new_data` to merge with
    /// newly discovered data.
    pub fn save(&self, project: &Project, regenerate: bool, merge_new_data: bool) -> Result<Project> {
        let mut payload = serde_json::to_value(project)
            .map_err(|err| Error::Validation(format!("unserializable project: {err}")))?;
        if let Some(fields) = payload.as_object_mut() {
            let id_is_empty = fields
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(str::is_empty);
            if id_is_empty {
                fields.remove("id");
            }
        }
        let mut query = Query::new();
        query.push_bool("download_and_process_data", regenerate);
        query.push_bool("merge_with_new_data", merge_new_data);
        self.client
            .call_one(Method::Post, "projects", &query, Some(&payload))?
            .ok_or_else(|| Error::Protocol("empty response to project save".into()))
    }

    /// Fuzzy search by project name. When an exact match exists it is first in
    /// the result, though more entries may follow.
    pub fn search(&self, search_name: &str) -> Result<Vec<ProjectInfo>> {
        let mut query = Query::new();
        query.push("name", search_name);
        self.client
            .call_list(Method::Get, "projects/search", &query, None)
    }

    /// First project whose name matches `name` exactly, if any.
    pub fn get_by_name(&self, name: &str) -> Result<Option<ProjectInfo>> {
        Ok(self
            .search(name)?
            .into_iter()
            .find(|project| project.name == name))
    }
}
