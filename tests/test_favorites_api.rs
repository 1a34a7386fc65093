use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use mockito::{Matcher, Server};
use nowastefood::{
    ApiRequest, ApiResponse, Favorite, FavoritesGateway, GeneratedRecipe, PlannerError, Recipe,
    RecipeApi, Step, Transport,
};
use reqwest::Method;
use serde_json::{json, Value};

fn id_token_for(sub: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": sub }).to_string());
    format!("eyJhbGciOiJub25lIn0.{}.sig", payload)
}

fn api_for(server: &Server) -> RecipeApi {
    RecipeApi::builder()
        .base_url(server.url())
        .tokens(Some("token".to_string()), Some(id_token_for("user-1")))
        .build()
        .unwrap()
}

fn soup() -> Recipe {
    Recipe {
        title: "Tomato Soup".to_string(),
        steps: vec![Step::from("Roast tomatoes."), Step::from("Blend.")],
    }
}

#[tokio::test]
async fn test_list_preserves_remote_order() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/favorites")
        .with_status(200)
        .with_body(
            r#"[
                {"userSub":"user-1","id":"b","title":"Risotto","steps":["Toast rice."]},
                {"userSub":"user-1","id":"a","title":"Omelette","steps":[{"action":"Whisk","minutes":1}]}
            ]"#,
        )
        .create_async()
        .await;

    let favorites = api_for(&server).favorites.list().await.unwrap();
    let ids: Vec<&str> = favorites.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(favorites[1].steps[0].display_text(), "Whisk (1 min)");
}

#[tokio::test]
async fn test_list_empty_body_is_empty_list() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/favorites")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let favorites = api_for(&server).favorites.list().await.unwrap();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn test_list_unauthenticated() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/favorites")
        .with_status(401)
        .with_body(r#"{"error":"UNAUTHENTICATED"}"#)
        .create_async()
        .await;

    let err = api_for(&server).favorites.list().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 401: UNAUTHENTICATED");
}

#[tokio::test]
async fn test_add_posts_title_and_steps() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/favorites")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "title": "Tomato Soup",
            "steps": ["Roast tomatoes.", "Blend."]
        })))
        .with_status(200)
        .with_body(r#"{"ok":true,"id":"fav-1"}"#)
        .create_async()
        .await;

    let favorite = api_for(&server).favorites.add(&soup()).await.unwrap();

    assert_eq!(favorite.id, "fav-1");
    assert_eq!(favorite.user_sub, "user-1");
    assert_eq!(favorite.title, "Tomato Soup");
    assert_eq!(favorite.steps, soup().steps);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_add_posts_structured_steps_unchanged() {
    let raw_step = json!({"action": "Bake", "minutes": 20, "celsius": 180, "note": "covered"});
    let generated = GeneratedRecipe::from_value(&json!({
        "title": "Bread",
        "steps": [raw_step.clone(), "Cool."]
    }));

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/favorites")
        .match_body(Matcher::Json(json!({
            "title": "Bread",
            "steps": [raw_step.clone(), "Cool."]
        })))
        .with_status(200)
        .with_body(r#"{"ok":true,"id":"fav-3"}"#)
        .create_async()
        .await;

    api_for(&server)
        .favorites
        .add(&generated.to_recipe())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_add_accepts_echoed_item() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/favorites")
        .with_status(200)
        .with_body(r#"{"userSub":"user-9","id":"fav-2","title":"Tomato Soup","steps":[]}"#)
        .create_async()
        .await;

    let favorite = api_for(&server).favorites.add(&soup()).await.unwrap();
    assert_eq!(favorite.key(), ("user-9", "fav-2"));
}

#[tokio::test]
async fn test_add_without_id_is_malformed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/favorites")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let err = api_for(&server).favorites.add(&soup()).await.unwrap_err();
    assert!(matches!(err, PlannerError::MalformedPayload));
}

#[tokio::test]
async fn test_remove_encodes_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/favorites/a%20b%2Fc")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    api_for(&server).favorites.remove("a b/c").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remove_error_normalization() {
    let mut server = Server::new_async().await;
    let _detail = server
        .mock("DELETE", "/favorites/x")
        .with_status(500)
        .with_body(r#"{"detail":"table missing"}"#)
        .create_async()
        .await;
    let _raw = server
        .mock("DELETE", "/favorites/y")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;
    let _empty = server
        .mock("DELETE", "/favorites/z")
        .with_status(503)
        .create_async()
        .await;

    let favorites = api_for(&server).favorites;
    assert_eq!(
        favorites.remove("x").await.unwrap_err().to_string(),
        "HTTP 500: table missing"
    );
    assert_eq!(
        favorites.remove("y").await.unwrap_err().to_string(),
        "HTTP 502: Bad Gateway"
    );
    assert_eq!(
        favorites.remove("z").await.unwrap_err().to_string(),
        "HTTP 503: Unknown error"
    );
}

#[tokio::test]
async fn test_remove_empty_id_rejected_locally() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = api_for(&server).favorites.remove("  ").await.unwrap_err();
    assert!(matches!(err, PlannerError::Validation(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_200_success_is_unexpected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("DELETE", "/favorites/a")
        .with_status(204)
        .create_async()
        .await;

    let err = api_for(&server).favorites.remove("a").await.unwrap_err();
    assert_eq!(err.to_string(), "Unexpected response (204).");
}

/// In-memory stand-in for the favorites table of one user.
#[derive(Default)]
struct MemoryStore {
    items: Mutex<Vec<Value>>,
    next_id: Mutex<u32>,
}

#[async_trait]
impl Transport for MemoryStore {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, PlannerError> {
        let mut items = self.items.lock().unwrap();
        let segments: Vec<&str> = request.segments.iter().map(String::as_str).collect();

        match (request.method, segments.as_slice()) {
            (Method::GET, ["favorites"]) => {
                Ok(ApiResponse::new(200, Value::Array(items.clone()).to_string()))
            }
            (Method::POST, ["favorites"]) => {
                let body = request.body.unwrap_or_default();
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                let id = format!("fav-{}", next_id);
                items.push(json!({
                    "userSub": "user-1",
                    "id": id,
                    "title": body["title"],
                    "steps": body["steps"]
                }));
                Ok(ApiResponse::new(200, json!({"ok": true, "id": id}).to_string()))
            }
            (Method::DELETE, ["favorites", id]) => {
                items.retain(|item| item["id"] != *id);
                Ok(ApiResponse::new(200, r#"{"ok":true}"#))
            }
            _ => Ok(ApiResponse::new(404, r#"{"error":"NOT_FOUND"}"#)),
        }
    }
}

#[tokio::test]
async fn test_add_then_list_round_trip() {
    let gateway = FavoritesGateway::new(Arc::new(MemoryStore::default()));

    let added = gateway.add(&soup()).await.unwrap();
    let listed: Vec<Favorite> = gateway.list().await.unwrap();

    let matching: Vec<&Favorite> = listed.iter().filter(|f| f.id == added.id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].title, "Tomato Soup");
    assert_eq!(matching[0].steps, soup().steps);
}

#[tokio::test]
async fn test_structured_steps_survive_round_trip() {
    let raw_step = json!({"action": "Fry", "minutes": "5", "celsius": 180, "pan": "cast iron"});
    let recipe = Recipe {
        title: "Fritters".to_string(),
        steps: vec![Step::from(raw_step.clone())],
    };
    let gateway = FavoritesGateway::new(Arc::new(MemoryStore::default()));

    let added = gateway.add(&recipe).await.unwrap();
    let listed = gateway.list().await.unwrap();
    let stored = listed.iter().find(|f| f.id == added.id).unwrap();

    assert_eq!(serde_json::to_value(&stored.steps).unwrap(), json!([raw_step]));
    assert_eq!(stored.steps[0].display_text(), "Fry (5 min) @ 180°C");
}

#[tokio::test]
async fn test_remove_then_list() {
    let gateway = FavoritesGateway::new(Arc::new(MemoryStore::default()));
    let first = gateway.add(&soup()).await.unwrap();
    let second = gateway.add(&soup()).await.unwrap();

    gateway.remove(&first.id).await.unwrap();
    let listed = gateway.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, second.id);

    // Unknown ids still settle with a definite answer
    assert!(gateway.remove("never-existed").await.is_ok());
    assert_eq!(gateway.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_planner_add_refreshes_list() {
    let api = RecipeApi::builder()
        .transport(Arc::new(MemoryStore::default()))
        .build()
        .unwrap();
    let mut planner = nowastefood::Planner::new(api);

    let favorite = planner.add_favorite(&soup()).await.unwrap();
    assert_eq!(planner.favorites().len(), 1);
    assert_eq!(planner.favorites()[0].id, favorite.id);

    planner.remove_favorite(&favorite.id).await.unwrap();
    assert!(planner.favorites().is_empty());
}
