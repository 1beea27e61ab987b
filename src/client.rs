//! lakeFS SDK main client.
//!
//! Provides the primary interface for interacting with the lakeFS API.

use std::sync::Arc;

use crate::clients::PullsApi;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::transport::{HttpTransport, Transport};

/// Main client for interacting with the lakeFS API.
///
/// Aggregates the resource clients over one shared transport. Every client is
/// constructed explicitly; there is no process-wide default instance.
///
/// # Example
///
/// ```rust,no_run
/// use lakefs_sdk::{ClientConfig, LakeFsClient, PullRequestCreation};
///
/// # async fn run() -> Result<(), lakefs_sdk::Error> {
/// let client = LakeFsClient::new(&ClientConfig::new("http://localhost:8000/api/v1"))?;
///
/// let creation = PullRequestCreation::new("Add partitions", "feature", "main");
/// let pull = client.pulls().create_pull_request("my-repo", &creation).await?;
/// println!("opened {}", pull.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LakeFsClient {
    transport: Arc<dyn Transport>,
    pulls: PullsApi,
}

impl LakeFsClient {
    /// Create a client over the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the HTTP transport cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client from environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the environment is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(&ClientConfig::from_env()?)
    }

    /// Create a client over any transport, e.g. a test double.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            pulls: PullsApi::new(Arc::clone(&transport)),
            transport,
        }
    }

    /// Get the underlying transport (for advanced use cases).
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Get the pulls client.
    #[must_use]
    pub fn pulls(&self) -> &PullsApi {
        &self.pulls
    }
}
