use std::sync::Arc;

use log::{debug, info};
use serde_json::{json, Value};

use crate::decoder::{as_message, is_truthy, parse_tolerant};
use crate::error::PlannerError;
use crate::model::{Favorite, Recipe};
use crate::session::SessionProvider;
use crate::transport::{path_segments, ApiRequest, ApiResponse, Transport};

/// Gateway to the per-user favorites resource.
///
/// Each call is independent; nothing is cached and there is no atomicity
/// across a list followed by a mutation.
#[derive(Clone)]
pub struct FavoritesGateway {
    transport: Arc<dyn Transport>,
    session: Option<Arc<dyn SessionProvider>>,
    segments: Vec<String>,
}

impl FavoritesGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: None,
            segments: path_segments("favorites"),
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.segments = path_segments(path);
        self
    }

    /// Use `session` to fill in the owner of freshly added favorites.
    pub fn with_session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(session);
        self
    }

    fn item_segments(&self, id: &str) -> Vec<String> {
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        segments
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResponse, PlannerError> {
        debug!("{} {}", request.method, request.path());
        let response = self.transport.send(request).await?;
        ensure_ok(&response)?;
        Ok(response)
    }

    /// List the current user's favorites in the order the store returns them.
    pub async fn list(&self) -> Result<Vec<Favorite>, PlannerError> {
        let response = self.call(ApiRequest::get(self.segments.clone())).await?;

        if response.body.trim().is_empty() {
            return Ok(Vec::new());
        }
        match parse_tolerant(&response.body) {
            Some(Value::Null) => Ok(Vec::new()),
            Some(value) => {
                serde_json::from_value(value).map_err(|_| PlannerError::MalformedPayload)
            }
            None => Err(PlannerError::MalformedPayload),
        }
    }

    /// Store `recipe` as a favorite and return the stored representation.
    pub async fn add(&self, recipe: &Recipe) -> Result<Favorite, PlannerError> {
        let body = json!({ "title": recipe.title, "steps": recipe.steps });
        let response = self
            .call(ApiRequest::post(self.segments.clone(), body))
            .await?;

        let value = parse_tolerant(&response.body).ok_or(PlannerError::MalformedPayload)?;

        // Some deployments echo the stored item, others only acknowledge
        // with `{ok, id}`.
        if let Ok(favorite) = serde_json::from_value::<Favorite>(value.clone()) {
            if value.get("userSub").is_some() {
                info!("Added favorite '{}' ({})", favorite.title, favorite.id);
                return Ok(favorite);
            }
        }

        let id = match value.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(PlannerError::MalformedPayload),
        };

        let user_sub = match &self.session {
            Some(provider) => provider.current_session().await?.user_sub(),
            None => None,
        };

        info!("Added favorite '{}' ({})", recipe.title, id);
        Ok(Favorite {
            id,
            user_sub: user_sub.unwrap_or_default(),
            title: recipe.title.clone(),
            steps: recipe.steps.clone(),
        })
    }

    /// Delete the favorite with `id`. Whether or not the id existed, the
    /// call settles with a definite result.
    pub async fn remove(&self, id: &str) -> Result<(), PlannerError> {
        if id.trim().is_empty() {
            return Err(PlannerError::Validation(
                "Favorite id cannot be empty.".to_string(),
            ));
        }

        self.call(ApiRequest::delete(self.item_segments(id)))
            .await?;
        info!("Removed favorite {}", id);
        Ok(())
    }
}

/// Accept only a 200 response; everything else becomes a normalized error.
fn ensure_ok(response: &ApiResponse) -> Result<(), PlannerError> {
    if response.status == 200 {
        return Ok(());
    }
    if response.is_success() {
        return Err(PlannerError::UnexpectedResponse(response.status));
    }

    Err(PlannerError::Http {
        status: response.status,
        message: error_message(&response.body),
    })
}

/// Pick the most useful message out of an error body: the envelope's
/// `error`, then its `detail`, then the raw text.
pub fn error_message(body: &str) -> String {
    let from_envelope = parse_tolerant(body).and_then(|value| {
        let object = value.as_object()?;
        ["error", "detail"]
            .iter()
            .filter_map(|key| object.get(*key))
            .find(|v| is_truthy(v))
            .map(as_message)
    });

    from_envelope.unwrap_or_else(|| {
        if body.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            body.to_string()
        }
    })
}
