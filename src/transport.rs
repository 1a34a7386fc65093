use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::error::PlannerError;
use crate::session::SessionProvider;

/// A request against the recipe API, relative to its base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments; each one is percent-encoded on its own
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiRequest {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    pub fn post<I, S>(segments: I, body: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiRequest {
            body: Some(body),
            ..Self::new(Method::POST, segments)
        }
    }

    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, segments)
    }

    /// Human-readable path, used in log lines.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Split a configured path such as `/dev/recipes` into its segments.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Status and raw body text of an API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to issue an authenticated request to the recipe API.
///
/// A non-2xx status is still `Ok`; only failures to complete the exchange
/// are errors. Callers decide how to read error bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, PlannerError>;
}

/// [`Transport`] backed by a shared reqwest client.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    session: Arc<dyn SessionProvider>,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, PlannerError> {
        let base_url =
            Url::parse(base_url).map_err(|e| PlannerError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PlannerError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    fn endpoint(&self, segments: &[String]) -> Result<Url, PlannerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PlannerError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, PlannerError> {
        let url = self.endpoint(&request.segments)?;
        let session = self.session.current_session().await?;

        debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method, url);
        if let Some(token) = session.access_token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("HTTP {} response body: {}", status, body);

        Ok(ApiResponse { status, body })
    }
}
