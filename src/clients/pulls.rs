//! Pull requests resource client.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, TransportError};
use crate::model::Model;
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::types::{
    ApiErrorBody, ListPullRequestsParams, PullRequest, PullRequestBasic, PullRequestCreation,
    PullRequestCreationResponse, PullRequestsList,
};

const PULLS_PATH: &str = "/repositories/{repository}/pulls";
const PULL_PATH: &str = "/repositories/{repository}/pulls/{pull_request}";

const PULL_REQUEST: &str = "pull request";
const REPOSITORY: &str = "repository";

/// Client for pull request operations.
///
/// Holds nothing but the shared transport, so it is cheap to clone and safe
/// to use from many tasks at once.
#[derive(Clone)]
pub struct PullsApi {
    transport: Arc<dyn Transport>,
}

impl PullsApi {
    /// Create a new pulls client.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a pull request and return it as stored by the server.
    ///
    /// The service answers a create with the new identifier only, so this
    /// issues the create and then reads the pull request back.
    ///
    /// # Errors
    ///
    /// `Conflict` if the server refuses the create (for example an
    /// equivalent open pull request exists), `NotFound` for an unknown
    /// repository, `Validation` for an empty repository name. If the create
    /// succeeds but the read fails, `ReadBack` carries the new identifier.
    pub async fn create_pull_request(
        &self,
        repository: &str,
        creation: &PullRequestCreation,
    ) -> Result<PullRequest, Error> {
        let id = self.create_pull_request_id(repository, creation).await?;
        match self.get_pull_request(repository, &id).await {
            Ok(pull) => Ok(pull),
            Err(source) => {
                warn!(
                    repository,
                    pull_request = %id,
                    error = %source,
                    "created pull request could not be read back"
                );
                Err(Error::ReadBack {
                    id,
                    source: Box::new(source),
                })
            }
        }
    }

    /// Create a pull request and return only its server-assigned identifier.
    ///
    /// # Errors
    ///
    /// Same as [`PullsApi::create_pull_request`].
    pub async fn create_pull_request_id(
        &self,
        repository: &str,
        creation: &PullRequestCreation,
    ) -> Result<String, Error> {
        require_non_empty("repository", repository)?;

        let request = ApiRequest::new(Method::POST, PULLS_PATH)
            .path_param("repository", repository)
            .json_body(creation.to_json());

        let response = self.call(request, REPOSITORY, repository).await?;
        let created = PullRequestCreationResponse::from_json_slice(&response.body)?;
        debug!(repository, pull_request = %created.id, "pull request created");
        Ok(created.id)
    }

    /// Get a pull request.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such identifier exists in the repository.
    pub async fn get_pull_request(
        &self,
        repository: &str,
        pull_request: &str,
    ) -> Result<PullRequest, Error> {
        require_non_empty("repository", repository)?;
        require_non_empty("pull_request", pull_request)?;

        let request = ApiRequest::new(Method::GET, PULL_PATH)
            .path_param("repository", repository)
            .path_param("pull_request", pull_request);

        let response = self.call(request, PULL_REQUEST, pull_request).await?;
        PullRequest::from_json_slice(&response.body)
    }

    /// Fetch one page of pull requests.
    ///
    /// # Errors
    ///
    /// `Validation` for out-of-range parameters, `NotFound` for an unknown
    /// repository.
    pub async fn list_pull_requests_page(
        &self,
        repository: &str,
        params: &ListPullRequestsParams,
    ) -> Result<PullRequestsList, Error> {
        require_non_empty("repository", repository)?;

        let request = ApiRequest::new(Method::GET, PULLS_PATH)
            .path_param("repository", repository)
            .query(params.to_query()?);

        let response = self.call(request, REPOSITORY, repository).await?;
        PullRequestsList::from_json_slice(&response.body)
    }

    /// List pull requests as a lazy stream.
    ///
    /// Pages are fetched on demand, following the server's `next_offset`.
    /// Items keep the server's order. The stream ends after the last page,
    /// when the server hands back an offset it already returned, or right
    /// after yielding the first error.
    pub fn list_pull_requests(
        &self,
        repository: &str,
        params: ListPullRequestsParams,
    ) -> BoxStream<'static, Result<PullRequest, Error>> {
        let pager = Pager {
            api: self.clone(),
            repository: repository.to_string(),
            seen: params.after.iter().cloned().collect(),
            params,
            buffer: VecDeque::new(),
            done: false,
        };

        stream::unfold(pager, |mut pager| async move {
            loop {
                if let Some(pull) = pager.buffer.pop_front() {
                    return Some((Ok(pull), pager));
                }
                if pager.done {
                    return None;
                }
                if let Err(e) = pager.fetch().await {
                    pager.done = true;
                    return Some((Err(e), pager));
                }
            }
        })
        .boxed()
    }

    /// Update a pull request. Unset patch fields are left unchanged.
    ///
    /// # Errors
    ///
    /// `Validation` if the patch asks for `merged`, `NotFound` if the pull
    /// request does not exist.
    pub async fn update_pull_request(
        &self,
        repository: &str,
        pull_request: &str,
        patch: &PullRequestBasic,
    ) -> Result<(), Error> {
        require_non_empty("repository", repository)?;
        require_non_empty("pull_request", pull_request)?;
        patch.validate()?;

        let request = ApiRequest::new(Method::PATCH, PULL_PATH)
            .path_param("repository", repository)
            .path_param("pull_request", pull_request)
            .json_body(patch.to_json());

        self.call(request, PULL_REQUEST, pull_request).await?;
        Ok(())
    }

    /// Update a pull request from an untyped patch.
    ///
    /// # Errors
    ///
    /// `Validation` without contacting the server if the patch names an
    /// immutable field such as `source_branch` or `destination_branch`;
    /// otherwise as [`PullsApi::update_pull_request`].
    pub async fn update_pull_request_from_value(
        &self,
        repository: &str,
        pull_request: &str,
        patch: &Value,
    ) -> Result<(), Error> {
        let patch = PullRequestBasic::from_value(patch)?;
        self.update_pull_request(repository, pull_request, &patch).await
    }

    async fn call(
        &self,
        request: ApiRequest,
        resource: &'static str,
        id: &str,
    ) -> Result<ApiResponse, Error> {
        let method = request.method.clone();
        let path = request.path();

        let response = self.transport.invoke(request).await.map_err(|e| {
            warn!(%method, %path, error = %e, "pull request call failed");
            Error::from(e)
        })?;
        debug!(%method, %path, status = response.status, "pull request call completed");

        check_status(response, resource, id)
    }
}

/// Page-following state behind [`PullsApi::list_pull_requests`].
struct Pager {
    api: PullsApi,
    repository: String,
    params: ListPullRequestsParams,
    /// Every `after` value requested so far.
    seen: HashSet<String>,
    buffer: VecDeque<PullRequest>,
    done: bool,
}

impl Pager {
    async fn fetch(&mut self) -> Result<(), Error> {
        let page = self
            .api
            .list_pull_requests_page(&self.repository, &self.params)
            .await?;

        let next = page.pagination.next_offset;
        let advanced = !next.is_empty() && self.seen.insert(next.clone());
        if page.pagination.has_more && !page.results.is_empty() && !advanced {
            warn!(
                repository = %self.repository,
                next_offset = %next,
                "server reported more pull requests without a new offset; stopping"
            );
        }

        self.done = !page.pagination.has_more || page.results.is_empty() || !advanced;
        self.params.after = Some(next);
        self.buffer.extend(page.results);
        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation("PullsApi", field, "must not be empty"));
    }
    Ok(())
}

/// Map a non-2xx response onto the error taxonomy.
fn check_status(
    response: ApiResponse,
    resource: &'static str,
    id: &str,
) -> Result<ApiResponse, Error> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status;
    let message = ApiErrorBody::from_json_slice(&response.body)
        .map(|body| body.message)
        .unwrap_or_else(|_| format!("HTTP {status}"));
    warn!(status, resource, id, %message, "API returned an error");

    Err(match status {
        404 => Error::NotFound {
            resource,
            id: id.to_string(),
            message,
        },
        409 => Error::Conflict {
            resource: PULL_REQUEST,
            message,
        },
        _ => Error::Transport(TransportError::Status {
            status,
            message,
            body: response.text(),
        }),
    })
}
