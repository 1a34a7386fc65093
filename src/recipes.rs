use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use tokio::time::timeout;

use crate::decoder::{self, RequestOutcome};
use crate::error::PlannerError;
use crate::transport::{path_segments, ApiRequest, ApiResponse, Transport};

/// Default wall-clock deadline for a generation request.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(30_000);

pub const EMPTY_SELECTION_MESSAGE: &str = "Please select or add at least one ingredient.";

/// Body of a `POST /recipes` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RecipeRequest {
    /// Recipe of the day; the backend picks the ingredients
    Daily,
    /// Recipe built from the caller's ingredients
    Custom { ingredients: Vec<String> },
}

impl RecipeRequest {
    /// Build a custom request from a selection.
    ///
    /// Names are trimmed, blanks dropped and duplicates removed keeping the
    /// first occurrence. An empty result is rejected before any network call.
    pub fn custom<I, S>(ingredients: I) -> Result<Self, PlannerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in ingredients {
            let name = name.as_ref().trim();
            if !name.is_empty() && !unique.iter().any(|u| u == name) {
                unique.push(name.to_string());
            }
        }

        if unique.is_empty() {
            return Err(PlannerError::Validation(EMPTY_SELECTION_MESSAGE.to_string()));
        }
        Ok(RecipeRequest::Custom {
            ingredients: unique,
        })
    }

    pub fn mode(&self) -> &'static str {
        match self {
            RecipeRequest::Daily => "daily",
            RecipeRequest::Custom { .. } => "custom",
        }
    }
}

/// Client for the recipe generator with a bounded wait.
#[derive(Clone)]
pub struct RecipeClient {
    transport: Arc<dyn Transport>,
    segments: Vec<String>,
    deadline: Duration,
}

impl RecipeClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            segments: path_segments("recipes"),
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.segments = path_segments(path);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Send `request` and resolve to exactly one outcome.
    ///
    /// The network call runs as its own task and races the deadline. If the
    /// deadline wins the task is detached: it may still complete, but its
    /// result is dropped and never reaches the caller. No retry is attempted.
    pub async fn generate(&self, request: &RecipeRequest) -> RequestOutcome {
        let body = match serde_json::to_value(request) {
            Ok(body) => body,
            Err(e) => return RequestOutcome::TransportError(e.to_string()),
        };
        let api_request = ApiRequest::post(self.segments.clone(), body);

        debug!("Dispatching {} recipe request", request.mode());
        let transport = Arc::clone(&self.transport);
        let call = tokio::spawn(async move { transport.send(api_request).await });

        match timeout(self.deadline, call).await {
            Err(_) => {
                let millis = deadline_millis(self.deadline);
                warn!(
                    "Recipe request timed out after {}ms; abandoning in-flight call",
                    millis
                );
                RequestOutcome::Timeout(millis)
            }
            Ok(Err(join_error)) => RequestOutcome::TransportError(join_error.to_string()),
            Ok(Ok(Err(e))) => RequestOutcome::TransportError(e.to_string()),
            Ok(Ok(Ok(response))) => outcome_from_response(&response),
        }
    }

    pub async fn daily(&self) -> RequestOutcome {
        self.generate(&RecipeRequest::Daily).await
    }

    /// Validate the selection, then generate. An empty selection returns the
    /// validation error without touching the network.
    pub async fn custom<I, S>(&self, ingredients: I) -> Result<RequestOutcome, PlannerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let request = RecipeRequest::custom(ingredients)?;
        Ok(self.generate(&request).await)
    }
}

/// Deadline in whole milliseconds, saturating at `u64::MAX`.
fn deadline_millis(deadline: Duration) -> u64 {
    u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX)
}

fn outcome_from_response(response: &ApiResponse) -> RequestOutcome {
    debug!("[/recipes] raw response: {}", response.body);

    if response.is_success() {
        return decoder::decode(&response.body);
    }

    match decoder::decode(&response.body) {
        RequestOutcome::ApplicationError(message) => RequestOutcome::ApplicationError(message),
        _ => {
            let text = response.body.trim();
            let text = if text.is_empty() { "Unknown error" } else { text };
            RequestOutcome::TransportError(format!("HTTP {}: {}", response.status, text))
        }
    }
}
