//! Data model types for the lakeFS API.

pub mod common;
pub mod objects;
pub mod pulls;

// Re-exports
pub use common::{ApiErrorBody, Pagination};
pub use objects::{ObjectError, ObjectErrorList};
pub use pulls::{
    ListPullRequestsParams, PullRequest, PullRequestBasic, PullRequestCreation,
    PullRequestCreationResponse, PullRequestStatus, PullRequestsList, PullRequestsState,
};
