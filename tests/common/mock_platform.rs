//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use cherrytrack::error::{Error, Result};
use cherrytrack::platform::PlatformService;
use cherrytrack::tracking::CiStatus;
use cherrytrack::types::{
    MergeResult, PrState, PullRequest, PullRequestDetails,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// Simple mock platform service for testing
///
/// Manually implements `PlatformService`:
/// - Auto-incrementing PR numbers for created PRs
/// - Call tracking for verification
/// - Configurable responses per PR
/// - Per-PR error injection for partial-failure tests
pub struct MockPlatformService {
    next_pr_number: AtomicU64,
    // Responses
    pr_responses: Mutex<HashMap<u64, PullRequestDetails>>,
    merge_responses: Mutex<HashMap<u64, MergeResult>>,
    ci_responses: Mutex<HashMap<u64, CiStatus>>,
    // Call tracking
    get_pr_calls: Mutex<Vec<u64>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    merge_pr_calls: Mutex<Vec<u64>>,
    retry_calls: Mutex<Vec<u64>>,
    ci_calls: Mutex<Vec<u64>>,
    // Error injection
    error_on_create_pr: Mutex<Option<String>>,
    merge_errors: Mutex<HashMap<u64, String>>,
    retry_errors: Mutex<HashMap<u64, String>>,
    ci_errors: Mutex<HashMap<u64, String>>,
}

impl MockPlatformService {
    /// Create a new mock with no configured responses
    pub fn new() -> Self {
        Self {
            next_pr_number: AtomicU64::new(1000),
            pr_responses: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            ci_responses: Mutex::new(HashMap::new()),
            get_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            retry_calls: Mutex::new(Vec::new()),
            ci_calls: Mutex::new(Vec::new()),
            error_on_create_pr: Mutex::new(None),
            merge_errors: Mutex::new(HashMap::new()),
            retry_errors: Mutex::new(HashMap::new()),
            ci_errors: Mutex::new(HashMap::new()),
        }
    }

    // === Error injection methods ===

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `squash_merge_pr` fail for one PR
    pub fn fail_merge_pr(&self, pr_number: u64, msg: &str) {
        self.merge_errors
            .lock()
            .unwrap()
            .insert(pr_number, msg.to_string());
    }

    /// Make `retry_failed_workflows` fail for one PR
    pub fn fail_retry(&self, pr_number: u64, msg: &str) {
        self.retry_errors
            .lock()
            .unwrap()
            .insert(pr_number, msg.to_string());
    }

    /// Make `get_ci_status` fail for one PR
    pub fn fail_ci_status(&self, pr_number: u64, msg: &str) {
        self.ci_errors
            .lock()
            .unwrap()
            .insert(pr_number, msg.to_string());
    }

    // === Response setup ===

    /// Set the response for `get_pr`
    pub fn set_pr_response(&self, details: PullRequestDetails) {
        self.pr_responses
            .lock()
            .unwrap()
            .insert(details.number, details);
    }

    /// Register a source PR that is still open
    pub fn setup_open_pr(&self, pr_number: u64, title: &str, head_sha: &str) {
        self.set_pr_response(PullRequestDetails {
            number: pr_number,
            title: title.to_string(),
            state: PrState::Open,
            sha: head_sha.to_string(),
            merge_commit_sha: Some(format!("test-merge-{pr_number}")),
            head_ref: format!("feature-{pr_number}"),
            base_ref: "main".to_string(),
            html_url: format!("https://github.com/test/repo/pull/{pr_number}"),
        });
    }

    /// Register a merged source PR landed as `merge_commit`
    pub fn setup_merged_pr(&self, pr_number: u64, title: &str, merge_commit: &str) {
        self.set_pr_response(PullRequestDetails {
            number: pr_number,
            title: title.to_string(),
            state: PrState::Merged,
            sha: merge_commit.to_string(),
            merge_commit_sha: Some(merge_commit.to_string()),
            head_ref: format!("feature-{pr_number}"),
            base_ref: "main".to_string(),
            html_url: format!("https://github.com/test/repo/pull/{pr_number}"),
        });
    }

    /// Set the response for `squash_merge_pr`
    pub fn set_merge_response(&self, pr_number: u64, result: MergeResult) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, result);
    }

    /// Make `squash_merge_pr` succeed for a PR
    pub fn setup_mergeable_pr(&self, pr_number: u64) {
        self.set_merge_response(
            pr_number,
            MergeResult {
                merged: true,
                sha: Some(format!("merged_sha_{pr_number}")),
                message: None,
            },
        );
    }

    /// Set the response for `get_ci_status`
    pub fn set_ci_response(&self, pr_number: u64, ci: CiStatus) {
        self.ci_responses.lock().unwrap().insert(pr_number, ci);
    }

    // === Call verification methods ===

    /// Get all `get_pr` calls
    pub fn get_pr_calls(&self) -> Vec<u64> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all `squash_merge_pr` calls
    pub fn get_merge_pr_calls(&self) -> Vec<u64> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Get all `retry_failed_workflows` calls
    pub fn get_retry_calls(&self) -> Vec<u64> {
        self.retry_calls.lock().unwrap().clone()
    }

    /// Get all `get_ci_status` calls
    pub fn get_ci_calls(&self) -> Vec<u64> {
        self.ci_calls.lock().unwrap().clone()
    }

    /// Total calls that reach the network in the real service
    pub fn network_call_count(&self) -> usize {
        self.get_pr_calls.lock().unwrap().len()
            + self.create_pr_calls.lock().unwrap().len()
            + self.merge_pr_calls.lock().unwrap().len()
            + self.retry_calls.lock().unwrap().len()
            + self.ci_calls.lock().unwrap().len()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    /// Assert that `squash_merge_pr` was called for a specific PR
    pub fn assert_merge_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            calls.contains(&pr_number),
            "Expected squash_merge_pr({pr_number}) but got: {calls:?}"
        );
    }

    /// Assert that `squash_merge_pr` was NOT called for a specific PR
    pub fn assert_merge_not_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            !calls.contains(&pr_number),
            "Expected squash_merge_pr({pr_number}) NOT to be called but it was: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pr(&self, pr_number: u64) -> Result<PullRequestDetails> {
        self.get_pr_calls.lock().unwrap().push(pr_number);

        let responses = self.pr_responses.lock().unwrap();
        responses.get(&pr_number).cloned().ok_or_else(|| {
            Error::Platform(format!("get_pr: no response configured for PR #{pr_number}"))
        })
    }

    async fn create_pr(
        &self,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/test/repo/pull/{number}"),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
        })
    }

    async fn squash_merge_pr(&self, pr_number: u64) -> Result<MergeResult> {
        self.merge_pr_calls.lock().unwrap().push(pr_number);

        if let Some(msg) = self.merge_errors.lock().unwrap().get(&pr_number) {
            return Err(Error::Platform(msg.clone()));
        }

        let responses = self.merge_responses.lock().unwrap();
        responses.get(&pr_number).cloned().ok_or_else(|| {
            Error::Platform(format!(
                "squash_merge_pr: no response configured for PR #{pr_number}"
            ))
        })
    }

    async fn retry_failed_workflows(&self, pr_number: u64) -> Result<usize> {
        self.retry_calls.lock().unwrap().push(pr_number);

        if let Some(msg) = self.retry_errors.lock().unwrap().get(&pr_number) {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(1)
    }

    async fn get_ci_status(&self, pr_number: u64) -> Result<CiStatus> {
        self.ci_calls.lock().unwrap().push(pr_number);

        if let Some(msg) = self.ci_errors.lock().unwrap().get(&pr_number) {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(self
            .ci_responses
            .lock()
            .unwrap()
            .get(&pr_number)
            .copied()
            .unwrap_or_default())
    }
}
