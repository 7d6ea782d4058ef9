use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};

use crate::config::JiraConfig;
use crate::domain::issue::Issue;
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

/// A stalled Jira call must not hang a dispatch forever; past this the
/// request fails and the error text becomes the reply.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct JiraClient {
    http: Client,
    config: JiraConfig,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| {
                AppError::Configuration(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self { http, config })
    }

    fn auth_header(&self) -> String {
        let pass = self.config.pass.as_deref().unwrap_or_default();
        let credentials = format!("{}:{}", self.config.user, pass);
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    /// `protocol://host:port[/base]/rest/api/{version}`, with any leading
    /// or trailing slashes stripped off the base segment.
    fn api_root(&self) -> String {
        let mut root = format!(
            "{}://{}:{}",
            self.config.protocol, self.config.host, self.config.port
        );
        if let Some(base) = self.config.base.as_deref() {
            let trimmed = base.trim_matches('/');
            if !trimmed.is_empty() {
                root.push('/');
                root.push_str(trimmed);
            }
        }
        root.push_str("/rest/api/");
        root.push_str(&self.config.api_version);
        root
    }

    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Err(AppError::IssueTracker(format!(
            "Jira responded with {status}: {body}"
        )))
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn find_issue(&self, key: &str) -> AppResult<Issue> {
        let url = format!("{}/issue/{}", self.api_root(), key);
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let response = Self::check_status(response).await?;
        response
            .json::<Issue>()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to parse Jira issue: {err}")))
    }

    async fn search_issues(&self, jql: &str) -> AppResult<Vec<Issue>> {
        let url = format!("{}/search", self.api_root());
        let response = self
            .http
            .get(url)
            .query(&[("jql", jql)])
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let response = Self::check_status(response).await?;
        let payload: JiraSearchResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Jira search response: {err}"))
        })?;
        Ok(payload.issues)
    }

    async fn transition_issue(&self, key: &str, transition_id: u32) -> AppResult<()> {
        let url = format!("{}/issue/{}/transitions", self.api_root(), key);
        let request_body = JiraTransitionRequest {
            transition: JiraTransitionId { id: transition_id },
        };
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        Self::check_status(response).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JiraTransitionRequest {
    transition: JiraTransitionId,
}

#[derive(Serialize)]
struct JiraTransitionId {
    id: u32,
}

#[derive(Deserialize)]
struct JiraSearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: Option<&str>) -> JiraConfig {
        JiraConfig {
            protocol: "https".to_string(),
            host: "jira.example.com".to_string(),
            port: 443,
            base: base.map(str::to_string),
            user: "bot".to_string(),
            pass: Some("secret".to_string()),
            api_version: "2".to_string(),
            response: Default::default(),
            sprint_field: None,
            custom_fields: Default::default(),
        }
    }

    #[test]
    fn builds_api_root_without_base() {
        let client = JiraClient::new(config(None)).unwrap();
        assert_eq!(client.api_root(), "https://jira.example.com:443/rest/api/2");
    }

    #[test]
    fn strips_slashes_from_base_path() {
        let client = JiraClient::new(config(Some("/jira/"))).unwrap();
        assert_eq!(
            client.api_root(),
            "https://jira.example.com:443/jira/rest/api/2"
        );
    }
}
