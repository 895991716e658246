//! Client for the remote test-management service.

use crate::config::schema::ApiConfig;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use websteps_common::action::Action;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed. Please try again with a valid token.")]
    Unauthorized,

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response format from API: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseCounts {
    pub total: u64,
    pub passing: u64,
    pub failing: u64,
    pub not_run: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub testcases: TestCaseCounts,
    pub last_run_date: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    id: Value,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    total_testcases: Option<u64>,
    #[serde(default)]
    passing_testcases: Option<u64>,
    #[serde(default)]
    failing_testcases: Option<u64>,
    #[serde(default)]
    not_run_testcases: Option<u64>,
    #[serde(default)]
    last_run_date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<RawProject> for Project {
    fn from(raw: RawProject) -> Self {
        Self {
            id: id_to_string(raw.id),
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            testcases: TestCaseCounts {
                total: raw.total_testcases.unwrap_or(0),
                passing: raw.passing_testcases.unwrap_or(0),
                failing: raw.failing_testcases.unwrap_or(0),
                not_run: raw.not_run_testcases.unwrap_or(0),
            },
            last_run_date: raw.last_run_date,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

fn id_to_string(id: Value) -> String {
    match id {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStepsRequest {
    pub actions: Vec<Action>,
    pub project_id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateStepsResponse {
    english_steps: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTestCaseRequest {
    pub name: String,
    pub description: String,
    /// Steps joined by newlines.
    pub steps: String,
    /// JSON encoding of the recorded actions.
    pub executed_code: String,
    pub status: String,
}

impl CreateTestCaseRequest {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        steps: &[String],
        actions: &[Action],
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: name.into(),
            description: description.into(),
            steps: steps.join("\n"),
            executed_code: serde_json::to_string(actions)?,
            status: "active".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTestCase {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct RawCreatedTestCase {
    id: Value,
}

#[async_trait]
pub trait TestCaseApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;

    /// Turns recorded actions into natural-language steps.
    async fn generate_steps(&self, request: &GenerateStepsRequest)
    -> Result<Vec<String>, ApiError>;

    async fn create_test_case(
        &self,
        project_id: &str,
        request: &CreateTestCaseRequest,
    ) -> Result<CreatedTestCase, ApiError>;
}

pub struct HttpTestCaseApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTestCaseApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base_url = Url::parse(base_url)?;
        // Endpoints are joined relative to the base, so its path must end in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url,
            config.resolved_token(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("API response status {}: {}", status, body);

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TestCaseApi for HttpTestCaseApi {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let url = self.endpoint("api/projects")?;
        let raw: Value = self.send(self.client.get(url)).await?;
        let Value::Array(items) = raw else {
            return Err(ApiError::InvalidResponse(
                "expected an array of projects".to_string(),
            ));
        };

        let projects = items
            .into_iter()
            .map(|item| serde_json::from_value::<RawProject>(item).map(Project::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        info!("Loaded {} projects", projects.len());
        Ok(projects)
    }

    async fn generate_steps(
        &self,
        request: &GenerateStepsRequest,
    ) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("api/generate-test-steps")?;
        let response: GenerateStepsResponse = self.send(self.client.post(url).json(request)).await?;
        response
            .english_steps
            .ok_or_else(|| ApiError::InvalidResponse("missing englishSteps".to_string()))
    }

    async fn create_test_case(
        &self,
        project_id: &str,
        request: &CreateTestCaseRequest,
    ) -> Result<CreatedTestCase, ApiError> {
        let url = self.endpoint(&format!("api/testcases/project/{}", project_id))?;
        let created: RawCreatedTestCase = self.send(self.client.post(url).json(request)).await?;
        let id = id_to_string(created.id);
        info!("Test case created: {}", id);
        Ok(CreatedTestCase { id })
    }
}
