//! HTTP transport for the lakeFS SDK.
//!
//! Resource clients describe each call as an [`ApiRequest`] and hand it to a
//! [`Transport`]. The transport performs the I/O and returns the status and
//! raw body; mapping those onto models and typed errors stays with the
//! resource clients.
//!
//! [`HttpTransport`] is the default implementation. It neither retries nor
//! caches: one call to [`Transport::invoke`] is one HTTP exchange.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, TransportError};

/// One remote operation, described independently of the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, e.g. `/repositories/{repository}/pulls`
    pub path_template: &'static str,
    pub path_params: Vec<(&'static str, String)>,
    pub query: Vec<(String, String)>,
    /// JSON body, already serialized
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path_template: &'static str) -> Self {
        Self {
            method,
            path_template,
            path_params: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn path_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path_params.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    #[must_use]
    pub fn json_body(mut self, body: String) -> Self {
        self.body = Some(body.into_bytes());
        self
    }

    /// Path segments with parameters substituted, not yet percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Request` if the template names a parameter
    /// that was not supplied.
    pub fn segments(&self) -> Result<Vec<String>, TransportError> {
        self.path_template
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => self
                        .path_params
                        .iter()
                        .find(|(param, _)| *param == name)
                        .map(|(_, value)| value.clone())
                        .ok_or_else(|| {
                            TransportError::Request(format!("missing path parameter `{name}`"))
                        }),
                    None => Ok(segment.to_string()),
                }
            })
            .collect()
    }

    /// Rendered path for logs and assertions. Parameters are not encoded.
    #[must_use]
    pub fn path(&self) -> String {
        match self.segments() {
            Ok(segments) => format!("/{}", segments.join("/")),
            Err(_) => self.path_template.to_string(),
        }
    }

    /// Body as UTF-8 text, if any.
    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The I/O collaborator used by every resource client.
///
/// Implementations must report network failures and timeouts as a
/// [`TransportError`]; non-2xx statuses are returned as a normal
/// [`ApiResponse`]. Dropping the returned future cancels the call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the base URL is invalid or the HTTP
    /// client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::Configuration(format!("invalid base URL `{}`: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "base URL `{base_url}` cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of a request: base path, encoded segments, query.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let segments = request.segments()?;
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                TransportError::Request(format!("base URL `{}` cannot carry a path", self.base_url))
            })?;
            path.pop_if_empty();
            for segment in &segments {
                path.push(segment);
            }
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn invoke(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request)?;
        debug!(method = %request.method, %url, "invoking API");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json");
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?.to_vec();
        debug!(status, bytes = body.len(), "API responded");

        Ok(ApiResponse { status, body })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    let mapped = if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    };
    warn!(error = %mapped, "transport failure");
    mapped
}
