use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use websteps_engine::action::Action;
use websteps_engine::api::{
    ApiError, CreateTestCaseRequest, CreatedTestCase, GenerateStepsRequest, Project, TestCaseApi,
};
use websteps_engine::storage::{MemoryStore, TestCaseHistory};
use websteps_engine::upload::{TestCaseForm, UploadError, save_test_case};

#[derive(Default)]
struct MockApi {
    fail_generate: bool,
    generate_calls: Mutex<Vec<GenerateStepsRequest>>,
    create_calls: Mutex<Vec<(String, CreateTestCaseRequest)>>,
}

#[async_trait]
impl TestCaseApi for MockApi {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        Ok(Vec::new())
    }

    async fn generate_steps(
        &self,
        request: &GenerateStepsRequest,
    ) -> Result<Vec<String>, ApiError> {
        self.generate_calls.lock().unwrap().push(request.clone());
        if self.fail_generate {
            return Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(vec![
            "Open the search page".to_string(),
            "Search for rust".to_string(),
        ])
    }

    async fn create_test_case(
        &self,
        project_id: &str,
        request: &CreateTestCaseRequest,
    ) -> Result<CreatedTestCase, ApiError> {
        self.create_calls
            .lock()
            .unwrap()
            .push((project_id.to_string(), request.clone()));
        Ok(CreatedTestCase {
            id: "tc-99".to_string(),
        })
    }
}

fn form() -> TestCaseForm {
    TestCaseForm {
        test_case_name: "Search".to_string(),
        project_id: "7".to_string(),
        description: "Searches the catalog".to_string(),
    }
}

fn actions() -> Vec<Action> {
    vec![
        Action::input("#q", "rust"),
        Action::click("button#search", Some("Search".into())),
    ]
}

#[tokio::test]
async fn test_save_generates_creates_and_stores() {
    let api = MockApi::default();
    let history = TestCaseHistory::new(Arc::new(MemoryStore::new()));

    let outcome = save_test_case(&form(), &actions(), "https://shop.test/", &api, &history)
        .await
        .unwrap();

    assert_eq!(outcome.remote_id, "tc-99");
    assert_eq!(outcome.steps.len(), 2);
    assert_eq!(outcome.history_len, 1);

    let generate = api.generate_calls.lock().unwrap();
    assert_eq!(generate[0].project_id, "7");
    assert_eq!(generate[0].url, "https://shop.test/");
    assert_eq!(generate[0].actions, actions());

    let create = api.create_calls.lock().unwrap();
    let (project_id, request) = &create[0];
    assert_eq!(project_id, "7");
    assert_eq!(request.name, "Search");
    assert_eq!(request.steps, "Open the search page\nSearch for rust");
    assert_eq!(request.status, "active");

    let stored = history.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, "completed");
    assert_eq!(stored[0].remote_id.as_deref(), Some("tc-99"));
    assert_eq!(stored[0].recorded_actions, actions());
}

#[tokio::test]
async fn test_save_rejects_empty_actions() {
    let api = MockApi::default();
    let history = TestCaseHistory::new(Arc::new(MemoryStore::new()));

    let result = save_test_case(&form(), &[], "https://shop.test/", &api, &history).await;
    assert!(matches!(result, Err(UploadError::NoActions)));
    assert!(api.generate_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_save_requires_project() {
    let api = MockApi::default();
    let history = TestCaseHistory::new(Arc::new(MemoryStore::new()));
    let form = TestCaseForm {
        project_id: "  ".to_string(),
        ..form()
    };

    let result = save_test_case(&form, &actions(), "https://shop.test/", &api, &history).await;
    assert!(matches!(result, Err(UploadError::MissingProject)));
}

#[tokio::test]
async fn test_generate_failure_stores_nothing() {
    let api = MockApi {
        fail_generate: true,
        ..MockApi::default()
    };
    let history = TestCaseHistory::new(Arc::new(MemoryStore::new()));

    let result = save_test_case(&form(), &actions(), "https://shop.test/", &api, &history).await;
    assert!(matches!(
        result,
        Err(UploadError::GenerateSteps(ApiError::Status { status: 500, .. }))
    ));
    assert!(api.create_calls.lock().unwrap().is_empty());
    assert!(history.list().await.unwrap().is_empty());
}
