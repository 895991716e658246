//! Submits a recording to the test-management service and records it locally.

use crate::api::{ApiError, CreateTestCaseRequest, GenerateStepsRequest, TestCaseApi};
use crate::storage::{KeyValueStore, StoreError, StoredTestCase, TestCaseHistory};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use websteps_common::action::Action;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No actions recorded")]
    NoActions,
    #[error("Please select a project")]
    MissingProject,
    #[error("Failed to generate test steps: {0}")]
    GenerateSteps(#[source] ApiError),
    #[error("Failed to create test case: {0}")]
    CreateTestCase(#[source] ApiError),
    #[error("Failed to store test case: {0}")]
    Store(#[from] StoreError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCaseForm {
    pub test_case_name: String,
    pub project_id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub remote_id: String,
    pub steps: Vec<String>,
    /// Number of records in the local history after the append.
    pub history_len: usize,
}

pub async fn save_test_case<A, K>(
    form: &TestCaseForm,
    actions: &[Action],
    page_url: &str,
    api: &A,
    history: &TestCaseHistory<K>,
) -> Result<UploadOutcome, UploadError>
where
    A: TestCaseApi + ?Sized,
    K: KeyValueStore + ?Sized,
{
    if actions.is_empty() {
        return Err(UploadError::NoActions);
    }
    if form.project_id.trim().is_empty() {
        return Err(UploadError::MissingProject);
    }

    let steps = api
        .generate_steps(&GenerateStepsRequest {
            actions: actions.to_vec(),
            project_id: form.project_id.clone(),
            url: page_url.to_string(),
        })
        .await
        .map_err(UploadError::GenerateSteps)?;
    info!("Generated {} steps", steps.len());

    let request =
        CreateTestCaseRequest::new(&form.test_case_name, &form.description, &steps, actions)?;
    let created = api
        .create_test_case(&form.project_id, &request)
        .await
        .map_err(UploadError::CreateTestCase)?;

    let record = StoredTestCase {
        test_case_name: form.test_case_name.clone(),
        project_id: form.project_id.clone(),
        description: form.description.clone(),
        recorded_actions: actions.to_vec(),
        steps: steps.clone(),
        recorded_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        url: page_url.to_string(),
        status: "completed".to_string(),
        remote_id: Some(created.id.clone()),
    };
    let history_len = history.append(record).await?;

    Ok(UploadOutcome {
        remote_id: created.id,
        steps,
        history_len,
    })
}
