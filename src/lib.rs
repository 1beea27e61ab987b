//! lakeFS SDK for Rust
//!
//! Typed client for the lakeFS HTTP API: validated request/response models
//! and resource clients that turn each remote operation into a method call.
//!
//! # Quick Start
//!
//! ```rust
//! use lakefs_sdk::{Model, ObjectError};
//!
//! let error = ObjectError::from_json(r#"{"status_code": 404, "message": "not found"}"#).unwrap();
//! assert_eq!(error.status_code, 404);
//! assert_eq!(error.path, None);
//! assert_eq!(error.to_json(), r#"{"message":"not found","status_code":404}"#);
//! ```

pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod model;
pub mod testing;
pub mod transport;
pub mod types;

// Re-exports
pub use client::LakeFsClient;
pub use clients::PullsApi;
pub use config::ClientConfig;
pub use error::{Error, TransportError};
pub use model::{Field, Model, Schema, WireEnum};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use types::{
    ApiErrorBody, ListPullRequestsParams, ObjectError, ObjectErrorList, Pagination, PullRequest,
    PullRequestBasic, PullRequestCreation, PullRequestCreationResponse, PullRequestStatus,
    PullRequestsList, PullRequestsState,
};
