//! Integration tests for the REST boundary.
//!
//! These tests drive the real router (handlers, identity middleware, JSON
//! projection) with in-memory port implementations behind the service, so no
//! database or network is involved.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use api_lib::config::Config;
use api_lib::web::{self, state::AppState};
use todo_core::domain::{NewTodo, Todo, TodoFilter, User};
use todo_core::ports::{DatabaseService, PortResult, WeatherService};
use todo_core::service::TodoService;

const CALLER_ID: &str = "3f1e2d4c-5b6a-4978-8899-aabbccddeeff";
const CALLER_EMAIL: &str = "caller@example.com";

//=========================================================================================
// In-memory Port Implementations
//=========================================================================================

struct InMemoryDb {
    todos: Mutex<Vec<Todo>>,
}

impl InMemoryDb {
    fn new() -> Self {
        Self {
            todos: Mutex::new(Vec::new()),
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }
}

fn matches_filter(todo: &Todo, filter: &TodoFilter) -> bool {
    if let Some(weather) = filter.weather.as_deref().filter(|w| !w.is_empty()) {
        if todo.weather != weather {
            return false;
        }
    }
    if let Some(from) = filter.modified_from {
        if todo.modified_at < from {
            return false;
        }
    }
    if let Some(until) = filter.modified_until {
        if todo.modified_at > until {
            return false;
        }
    }
    true
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn insert_todo(&self, new_todo: NewTodo, weather: String, owner: User) -> PortResult<Todo> {
        let mut todos = self.todos.lock().unwrap();
        let now = Self::base_time() + Duration::seconds(todos.len() as i64);
        let todo = Todo {
            id: Uuid::new_v4(),
            title: new_todo.title,
            contents: new_todo.contents,
            weather,
            owner,
            created_at: now,
            modified_at: now,
        };
        todos.push(todo.clone());
        Ok(todo)
    }

    async fn find_todo_with_owner(&self, todo_id: Uuid) -> PortResult<Option<Todo>> {
        let todos = self.todos.lock().unwrap();
        Ok(todos.iter().find(|t| t.id == todo_id).cloned())
    }

    async fn list_todos(&self, filter: &TodoFilter, offset: i64, limit: i64) -> PortResult<Vec<Todo>> {
        let todos = self.todos.lock().unwrap();
        let mut matches: Vec<Todo> = todos
            .iter()
            .filter(|t| matches_filter(t, filter))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(matches
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_todos(&self, filter: &TodoFilter) -> PortResult<i64> {
        let todos = self.todos.lock().unwrap();
        Ok(todos.iter().filter(|t| matches_filter(t, filter)).count() as i64)
    }
}

struct FixedWeather(&'static str);

#[async_trait]
impl WeatherService for FixedWeather {
    async fn today_weather(&self) -> PortResult<String> {
        Ok(self.0.to_string())
    }
}

//=========================================================================================
// Test Harness
//=========================================================================================

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: String::new(),
        log_level: tracing::Level::INFO,
        weather_api_url: String::new(),
        default_page_size: 10,
    }
}

fn test_app(weather: &'static str) -> Router {
    let state = Arc::new(AppState {
        todos: TodoService::new(Arc::new(InMemoryDb::new()), Arc::new(FixedWeather(weather))),
        config: Arc::new(test_config()),
    });
    web::router(state)
}

fn create_request(title: &str, contents: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/todos")
        .header("x-user-id", CALLER_ID)
        .header("x-user-email", CALLER_EMAIL)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "title": title, "contents": contents }).to_string(),
        ))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-user-id", CALLER_ID)
        .header("x-user-email", CALLER_EMAIL)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = test_app("Sunny");

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn todo_routes_reject_requests_without_forwarded_identity() {
    let app = test_app("Sunny");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/todos")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/todos")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "title": "t", "contents": "c" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_returns_the_stored_todo_with_weather_and_owner() {
    let app = test_app("Sunny");

    let response = app.oneshot(create_request("Buy milk", "2%")).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["title"], "Buy milk");
    assert_eq!(body["contents"], "2%");
    assert_eq!(body["weather"], "Sunny");
    assert_eq!(body["owner"]["id"], CALLER_ID);
    assert_eq!(body["owner"]["email"], CALLER_EMAIL);
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn create_rejects_empty_title() {
    let app = test_app("Sunny");

    let response = app.oneshot(create_request("   ", "contents")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_returns_the_full_projection() {
    let app = test_app("Cloudy");

    let created = json_body(
        app.clone()
            .oneshot(create_request("Walk the dog", "before dusk"))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app.oneshot(get_request(&format!("/todos/{id}"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["weather"], "Cloudy");
    assert_eq!(body["owner"]["email"], CALLER_EMAIL);
    assert!(body["created_at"].is_string());
    assert!(body["modified_at"].is_string());
}

#[tokio::test]
async fn get_unknown_todo_returns_not_found_message() {
    let app = test_app("Sunny");

    let response = app
        .oneshot(get_request(&format!("/todos/{}", Uuid::new_v4())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(text_body(response).await, "Todo not found");
}

#[tokio::test]
async fn list_returns_the_page_envelope() {
    let app = test_app("Sunny");

    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(create_request(&format!("todo {i}"), "contents"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.oneshot(get_request("/todos?page=1&size=2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["size"], 2);
    assert_eq!(body["total_count"], 3);
    // Most recently created first.
    assert_eq!(body["items"][0]["title"], "todo 2");
}

#[tokio::test]
async fn list_rejects_a_zero_page() {
    let app = test_app("Sunny");

    let response = app.oneshot(get_request("/todos?page=0&size=5")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_by_weather_through_the_query_string() {
    let app = test_app("Sunny");

    for i in 0..2 {
        app.clone()
            .oneshot(create_request(&format!("todo {i}"), "contents"))
            .await
            .unwrap();
    }

    let sunny = json_body(app.clone().oneshot(get_request("/todos?weather=Sunny")).await.unwrap()).await;
    assert_eq!(sunny["total_count"], 2);

    let rainy = json_body(app.oneshot(get_request("/todos?weather=Rain")).await.unwrap()).await;
    assert_eq!(rainy["total_count"], 0);
    assert_eq!(rainy["items"].as_array().unwrap().len(), 0);
}
