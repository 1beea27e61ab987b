//! Integration tests for the lakeFS Rust SDK.
//!
//! These tests run against a live lakeFS server and verify end-to-end
//! pull request workflows. The repository and both branches must exist, and
//! the source branch must differ from the destination.
//!
//! To run these tests:
//! ```bash
//! LAKEFS_INTEGRATION_TESTS=1 LAKEFS_ENDPOINT=http://localhost:8000/api/v1 \
//!   LAKEFS_TEST_REPOSITORY=example-repo LAKEFS_TEST_SOURCE_BRANCH=feature \
//!   cargo test --test integration_tests -- --ignored
//! ```

use std::env;

use futures_util::TryStreamExt;
use lakefs_sdk::{
    Error, LakeFsClient, ListPullRequestsParams, PullRequest, PullRequestBasic,
    PullRequestCreation, PullRequestStatus, PullRequestsState,
};
use uuid::Uuid;

/// Check if integration tests should run.
fn should_run_integration_tests() -> bool {
    env::var("LAKEFS_INTEGRATION_TESTS").map_or(false, |v| v == "1")
}

fn repository() -> String {
    env::var("LAKEFS_TEST_REPOSITORY").unwrap_or_else(|_| "example-repo".to_string())
}

fn source_branch() -> String {
    env::var("LAKEFS_TEST_SOURCE_BRANCH").unwrap_or_else(|_| "feature".to_string())
}

fn destination_branch() -> String {
    env::var("LAKEFS_TEST_DESTINATION_BRANCH").unwrap_or_else(|_| "main".to_string())
}

/// Generate a unique title for test resources.
fn unique_title(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().to_string()[..8])
}

fn client() -> LakeFsClient {
    LakeFsClient::from_env().expect("Client creation should succeed")
}

/// Open a pull request and return it. Fails the test on conflict, which means
/// a previous run left one open between the test branches.
async fn open_pull_request(client: &LakeFsClient, prefix: &str) -> PullRequest {
    let creation = PullRequestCreation::new(unique_title(prefix), source_branch(), destination_branch())
        .with_description("created by the SDK integration tests");
    client
        .pulls()
        .create_pull_request(&repository(), &creation)
        .await
        .expect("Create should succeed")
}

async fn close(client: &LakeFsClient, id: &str) {
    let patch = PullRequestBasic::default().with_status(PullRequestStatus::Closed);
    client
        .pulls()
        .update_pull_request(&repository(), id, &patch)
        .await
        .expect("Close should succeed");
}

mod pull_request_lifecycle {
    use super::*;

    /// Create → Get → Close
    #[tokio::test]
    #[ignore = "Integration test requires LAKEFS_INTEGRATION_TESTS=1 and a running lakeFS"]
    async fn test_create_get_close() {
        if !should_run_integration_tests() {
            return;
        }
        let client = client();

        let pull = open_pull_request(&client, "it-create").await;
        assert_eq!(pull.status, PullRequestStatus::Open);
        assert_eq!(pull.source_branch, source_branch());
        assert_eq!(pull.destination_branch, destination_branch());
        assert!(pull.closed_date.is_none());

        let fetched = client
            .pulls()
            .get_pull_request(&repository(), &pull.id)
            .await
            .expect("Get should succeed");
        assert_eq!(fetched, pull);

        close(&client, &pull.id).await;

        let closed = client
            .pulls()
            .get_pull_request(&repository(), &pull.id)
            .await
            .expect("Get should succeed");
        assert_eq!(closed.status, PullRequestStatus::Closed);
        assert_eq!(closed.creation_date, pull.creation_date);
        assert!(closed.closed_date.is_some());
    }

    #[tokio::test]
    #[ignore = "Integration test requires LAKEFS_INTEGRATION_TESTS=1 and a running lakeFS"]
    async fn test_update_title_keeps_branches() {
        if !should_run_integration_tests() {
            return;
        }
        let client = client();
        let pull = open_pull_request(&client, "it-retitle").await;

        let new_title = unique_title("it-renamed");
        let patch = PullRequestBasic::default().with_title(new_title.clone());
        client
            .pulls()
            .update_pull_request(&repository(), &pull.id, &patch)
            .await
            .expect("Update should succeed");

        let updated = client
            .pulls()
            .get_pull_request(&repository(), &pull.id)
            .await
            .expect("Get should succeed");
        assert_eq!(updated.title, new_title);
        assert_eq!(updated.source_branch, pull.source_branch);
        assert_eq!(updated.destination_branch, pull.destination_branch);

        close(&client, &pull.id).await;
    }

    #[tokio::test]
    #[ignore = "Integration test requires LAKEFS_INTEGRATION_TESTS=1 and a running lakeFS"]
    async fn test_open_pull_request_is_listed() {
        if !should_run_integration_tests() {
            return;
        }
        let client = client();
        let pull = open_pull_request(&client, "it-list").await;

        let params = ListPullRequestsParams::default()
            .with_status(PullRequestsState::Open)
            .with_amount(1);
        let listed: Vec<PullRequest> = client
            .pulls()
            .list_pull_requests(&repository(), params)
            .try_collect()
            .await
            .expect("List should succeed");
        assert!(listed.iter().any(|p| p.id == pull.id));
        assert!(listed.iter().all(|p| p.status == PullRequestStatus::Open));

        close(&client, &pull.id).await;
    }
}

mod errors {
    use super::*;

    #[tokio::test]
    #[ignore = "Integration test requires LAKEFS_INTEGRATION_TESTS=1 and a running lakeFS"]
    async fn test_get_nonexistent_pull_request_is_not_found() {
        if !should_run_integration_tests() {
            return;
        }

        let result = client()
            .pulls()
            .get_pull_request(&repository(), &unique_title("missing"))
            .await;

        match result {
            Err(Error::NotFound { .. }) => {}
            Err(e) => panic!("Expected NotFound error, got: {e:?}"),
            Ok(_) => panic!("Expected error, got success"),
        }
    }

    #[tokio::test]
    #[ignore = "Integration test requires LAKEFS_INTEGRATION_TESTS=1 and a running lakeFS"]
    async fn test_unknown_repository_is_not_found() {
        if !should_run_integration_tests() {
            return;
        }

        let repository = unique_title("no-such-repo");
        let result = client()
            .pulls()
            .list_pull_requests_page(&repository, &ListPullRequestsParams::default())
            .await;

        assert!(matches!(result, Err(ref e) if e.is_not_found()), "got {result:?}");
    }
}
