//! lakeFS Rust SDK - Pull Request Workflow Example
//!
//! Walks one pull request through its lifecycle:
//! 1. Open a pull request between two existing branches
//! 2. Read it back
//! 3. Retitle it
//! 4. List open pull requests
//! 5. Close it
//!
//! Configure with `LAKEFS_ENDPOINT`, `LAKEFS_REPOSITORY`, `LAKEFS_SOURCE_BRANCH`
//! and `LAKEFS_DESTINATION_BRANCH`. Set `RUST_LOG=lakefs_sdk=debug` to see
//! each HTTP exchange.

use std::env;

use futures_util::StreamExt;
use tracing_subscriber::EnvFilter;

use lakefs_sdk::{
    LakeFsClient, ListPullRequestsParams, PullRequestBasic, PullRequestCreation,
    PullRequestStatus, PullRequestsState,
};

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== lakeFS Rust SDK Example ===\n");

    let repository = env_or("LAKEFS_REPOSITORY", "example-repo");
    let source = env_or("LAKEFS_SOURCE_BRANCH", "feature");
    let destination = env_or("LAKEFS_DESTINATION_BRANCH", "main");

    let client = LakeFsClient::from_env()?;
    let pulls = client.pulls();

    println!("1. Opening pull request {source} -> {destination}...");
    let creation = PullRequestCreation::new(
        format!("Merge {source} into {destination}"),
        source.as_str(),
        destination.as_str(),
    )
    .with_description("Opened by the lakeFS Rust SDK example");

    let pull = match pulls.create_pull_request(&repository, &creation).await {
        Ok(pull) => pull,
        Err(e) if e.is_conflict() => {
            println!("   An equivalent pull request is already open: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("   Opened {} by {}", pull.id, pull.author);

    println!("\n2. Reading it back...");
    let fetched = pulls.get_pull_request(&repository, &pull.id).await?;
    println!("   Status: {}", fetched.status);
    println!("   Created: {}", fetched.creation_date);

    println!("\n3. Retitling...");
    let retitle = PullRequestBasic::default().with_title(format!("[ready] {}", fetched.title));
    pulls
        .update_pull_request(&repository, &pull.id, &retitle)
        .await?;
    println!("   Done");

    println!("\n4. Listing open pull requests...");
    let params = ListPullRequestsParams::default()
        .with_status(PullRequestsState::Open)
        .with_amount(50);
    let mut listing = pulls.list_pull_requests(&repository, params);
    let mut count = 0;
    while let Some(item) = listing.next().await {
        let item = item?;
        count += 1;
        println!("   - {} {:?} ({} -> {})", item.id, item.title, item.source_branch, item.destination_branch);
    }
    println!("   {count} open");

    println!("\n5. Closing...");
    let close = PullRequestBasic::default().with_status(PullRequestStatus::Closed);
    pulls.update_pull_request(&repository, &pull.id, &close).await?;
    let closed = pulls.get_pull_request(&repository, &pull.id).await?;
    println!(
        "   Status: {} at {}",
        closed.status,
        closed
            .closed_date
            .map_or_else(|| "-".to_string(), |d| d.to_rfc3339())
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
