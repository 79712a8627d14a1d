//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::tracking::CiStatus;
use crate::types::{MergeResult, PlatformConfig, PrState, PullRequest, PullRequestDetails};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Workflow-run conclusions that `rerun-failed-jobs` can act on
const FAILED_CONCLUSIONS: &[&str] = &["failure", "timed_out", "startup_failure"];

/// GitHub service using octocrab, plus raw REST for Actions and CI status
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests
    token: String,
    /// HTTP client for raw requests (Actions, CI status)
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service for github.com or a GitHub Enterprise host
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let api_base = host.as_ref().map_or_else(
            || "https://api.github.com".to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::with_api_base(
            token,
            PlatformConfig { owner, repo, host },
            &api_base,
        )
    }

    /// Create a service talking to an explicit API base URL
    pub fn with_api_base(token: &str, config: PlatformConfig, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("cherrytrack")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.config.owner, self.config.repo, path
        )
    }

    /// GET a repository-relative path; `Ok(None)` on 404, error on any other failure
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self.repo_url(path);
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(path, "GET returned 404");
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "GET {path} returned {status}: {}",
                text.trim()
            )));
        }

        let body = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse {path}: {e}")))?;
        Ok(Some(body))
    }

    async fn post(&self, path: &str) -> Result<()> {
        let url = self.repo_url(path);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "POST {path} returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Head commit of a PR, via raw REST
    async fn head_sha(&self, pr_number: u64) -> Result<String> {
        #[derive(Deserialize)]
        struct PullHead {
            head: HeadRef,
        }

        #[derive(Deserialize)]
        struct HeadRef {
            sha: String,
        }

        let pull: PullHead = self
            .get_json(&format!("pulls/{pr_number}"))
            .await?
            .ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} not found")))?;
        Ok(pull.head.sha)
    }

    /// Legacy commit statuses via the combined status API
    async fn commit_status_state(&self, sha: &str) -> Result<CiStatus> {
        #[derive(Deserialize)]
        struct CombinedStatus {
            state: String,
            total_count: u32,
        }

        let Some(status) = self
            .get_json::<CombinedStatus>(&format!("commits/{sha}/status"))
            .await?
        else {
            debug!("No commit statuses for this commit");
            return Ok(CiStatus::Passing);
        };

        // No statuses configured = passing
        if status.total_count == 0 {
            return Ok(CiStatus::Passing);
        }

        debug!(state = %status.state, count = status.total_count, "Commit status result");
        Ok(match status.state.as_str() {
            "success" => CiStatus::Passing,
            "pending" => CiStatus::Pending,
            "failure" | "error" => CiStatus::Failing,
            _ => CiStatus::Unknown,
        })
    }

    /// GitHub Actions check runs
    async fn check_runs_state(&self, sha: &str) -> Result<CiStatus> {
        #[derive(Deserialize)]
        struct CheckRunsResponse {
            total_count: u32,
            check_runs: Vec<CheckRun>,
        }

        #[derive(Deserialize)]
        struct CheckRun {
            status: String,
            conclusion: Option<String>,
        }

        let Some(check_runs) = self
            .get_json::<CheckRunsResponse>(&format!("commits/{sha}/check-runs"))
            .await?
        else {
            debug!("No check runs for this commit");
            return Ok(CiStatus::Passing);
        };

        if check_runs.total_count == 0 {
            return Ok(CiStatus::Passing);
        }

        let mut in_progress = false;
        for run in &check_runs.check_runs {
            if run.status != "completed" {
                in_progress = true;
                continue;
            }
            match run.conclusion.as_deref() {
                Some("success" | "neutral" | "skipped") => {}
                Some(conclusion) => {
                    debug!(conclusion = %conclusion, "Check run failed");
                    return Ok(CiStatus::Failing);
                }
                // Completed but no conclusion? Treat as failure
                None => return Ok(CiStatus::Failing),
            }
        }

        Ok(if in_progress {
            CiStatus::Pending
        } else {
            CiStatus::Passing
        })
    }
}

/// Fold the two GitHub CI systems into one state; failures dominate
const fn combine_ci(a: CiStatus, b: CiStatus) -> CiStatus {
    match (a, b) {
        (CiStatus::Failing, _) | (_, CiStatus::Failing) => CiStatus::Failing,
        (CiStatus::Pending, _) | (_, CiStatus::Pending) => CiStatus::Pending,
        (CiStatus::Unknown, _) | (_, CiStatus::Unknown) => CiStatus::Unknown,
        (CiStatus::Passing, CiStatus::Passing) => CiStatus::Passing,
    }
}

/// Squash commit title: the PR title followed by its number
fn squash_title(title: &str, pr_number: u64) -> String {
    format!("{title} (#{pr_number})")
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pr(&self, pr_number: u64) -> Result<PullRequestDetails> {
        debug!(pr_number, "getting PR");

        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?;

        let state = match pr.state {
            Some(octocrab::models::IssueState::Open) => PrState::Open,
            Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
            // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
            Some(_) | None => PrState::Closed,
        };

        let details = PullRequestDetails {
            number: pr.number,
            title: pr.title.clone().unwrap_or_default(),
            state,
            sha: pr.head.sha.clone(),
            merge_commit_sha: pr.merge_commit_sha.clone(),
            head_ref: pr.head.ref_field.clone(),
            base_ref: pr.base.ref_field.clone(),
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        };

        debug!(pr_number, state = %details.state, "got PR");
        Ok(details)
    }

    async fn create_pr(
        &self,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest> {
        debug!(head, base, "creating PR");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn squash_merge_pr(&self, pr_number: u64) -> Result<MergeResult> {
        debug!(pr_number, "squash-merging PR");

        // Commit title keeps "(#N)" so release scans can find it
        let details = self.get_pr(pr_number).await?;
        let result = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .merge(pr_number)
            .method(octocrab::params::pulls::MergeMethod::Squash)
            .title(squash_title(&details.title, pr_number))
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge failed: {e}")))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    async fn retry_failed_workflows(&self, pr_number: u64) -> Result<usize> {
        #[derive(Deserialize)]
        struct WorkflowRuns {
            workflow_runs: Vec<WorkflowRun>,
        }

        #[derive(Deserialize)]
        struct WorkflowRun {
            id: u64,
            name: Option<String>,
            conclusion: Option<String>,
        }

        debug!(pr_number, "retrying failed workflows");
        let sha = self.head_sha(pr_number).await?;

        let runs: WorkflowRuns = self
            .get_json(&format!("actions/runs?head_sha={sha}"))
            .await?
            .ok_or_else(|| {
                Error::GitHubApi(format!("Failed to list workflow runs for PR #{pr_number}"))
            })?;

        let failed: Vec<&WorkflowRun> = runs
            .workflow_runs
            .iter()
            .filter(|r| {
                r.conclusion
                    .as_deref()
                    .is_some_and(|c| FAILED_CONCLUSIONS.contains(&c))
            })
            .collect();

        if failed.is_empty() {
            return Err(Error::Platform(format!(
                "no failed workflow runs found for PR #{pr_number}"
            )));
        }

        for run in &failed {
            debug!(run_id = run.id, name = ?run.name, "re-running failed jobs");
            self.post(&format!("actions/runs/{}/rerun-failed-jobs", run.id))
                .await?;
        }

        info!(pr_number, count = failed.len(), "re-queued failed workflow runs");
        Ok(failed.len())
    }

    async fn get_ci_status(&self, pr_number: u64) -> Result<CiStatus> {
        debug!(pr_number, "checking CI status");
        let sha = self.head_sha(pr_number).await?;

        let statuses = self.commit_status_state(&sha).await?;
        let check_runs = self.check_runs_state(&sha).await?;
        let combined = combine_ci(statuses, check_runs);

        debug!(pr_number, %combined, "checked CI status");
        Ok(combined)
    }
}
