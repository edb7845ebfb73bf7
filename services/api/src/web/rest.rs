//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use todo_core::domain::{AuthUser, NewTodo, Todo, TodoFilter, TodoPage, User};
use todo_core::ports::PortError;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_todo_handler,
        list_todos_handler,
        get_todo_handler,
        health_handler,
    ),
    components(
        schemas(
            CreateTodoRequest,
            TodoSaveResponse,
            TodoResponse,
            TodoPageResponse,
            UserResponse,
        )
    ),
    tags(
        (name = "Todo API", description = "API endpoints for weather-stamped todos.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request payload for creating a todo.
#[derive(Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    title: String,
    contents: String,
}

/// The minimal owner projection exposed by every todo response.
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    id: Uuid,
    email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// The response payload sent after successfully creating a todo.
#[derive(Serialize, ToSchema)]
pub struct TodoSaveResponse {
    id: Uuid,
    title: String,
    contents: String,
    weather: String,
    owner: UserResponse,
}

impl From<Todo> for TodoSaveResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            contents: todo.contents,
            weather: todo.weather,
            owner: todo.owner.into(),
        }
    }
}

/// The full todo projection returned by reads.
#[derive(Serialize, ToSchema)]
pub struct TodoResponse {
    id: Uuid,
    title: String,
    contents: String,
    weather: String,
    owner: UserResponse,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            contents: todo.contents,
            weather: todo.weather,
            owner: todo.owner.into(),
            created_at: todo.created_at,
            modified_at: todo.modified_at,
        }
    }
}

/// One page of todos plus the paging inputs and the filter-wide total.
#[derive(Serialize, ToSchema)]
pub struct TodoPageResponse {
    items: Vec<TodoResponse>,
    page: i64,
    size: i64,
    total_count: i64,
}

impl From<TodoPage> for TodoPageResponse {
    fn from(page: TodoPage) -> Self {
        Self {
            items: page.items.into_iter().map(TodoResponse::from).collect(),
            page: page.page,
            size: page.size,
            total_count: page.total_count,
        }
    }
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTodosParams {
    /// 1-based page number. Defaults to 1.
    page: Option<i64>,
    /// Number of items per page. Defaults to the configured page size.
    size: Option<i64>,
    /// Exact-match filter on the weather snapshot.
    weather: Option<String>,
    /// Inclusive lower bound on the last-modified timestamp (RFC 3339).
    start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the last-modified timestamp (RFC 3339).
    end_date: Option<DateTime<Utc>>,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a port failure onto the boundary response. Internal causes are logged
/// and replaced with a generic body.
fn port_error_response(err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
        PortError::Unexpected(message) => {
            error!("todo operation failed: {message}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred".to_string(),
            )
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new todo stamped with today's weather.
///
/// The weather string is fetched once at creation time and stored with the
/// record. The caller identity must be forwarded by the gateway.
#[utoipa::path(
    post,
    path = "/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created successfully", body = TodoSaveResponse),
        (status = 400, description = "Empty title or contents"),
        (status = 401, description = "Missing caller identity"),
        (status = 500, description = "Weather lookup or persistence failed")
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the caller."),
        ("x-user-email" = String, Header, description = "The email of the caller.")
    )
)]
pub async fn create_todo_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title must not be empty".to_string()));
    }
    if req.contents.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "contents must not be empty".to_string(),
        ));
    }

    let todo = state
        .todos
        .create_todo(
            &auth_user,
            NewTodo {
                title: req.title,
                contents: req.contents,
            },
        )
        .await
        .map_err(port_error_response)?;

    Ok((StatusCode::CREATED, Json(TodoSaveResponse::from(todo))))
}

/// List todos, most recently modified first.
///
/// Supports optional exact-match weather filtering and an inclusive range on
/// the last-modified timestamp. The returned total count covers every record
/// matching the filter, independent of the requested page.
#[utoipa::path(
    get,
    path = "/todos",
    params(
        ListTodosParams,
        ("x-user-id" = Uuid, Header, description = "The unique ID of the caller."),
        ("x-user-email" = String, Header, description = "The email of the caller.")
    ),
    responses(
        (status = 200, description = "One page of todos", body = TodoPageResponse),
        (status = 400, description = "Non-positive page or size"),
        (status = 401, description = "Missing caller identity")
    )
)]
pub async fn list_todos_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTodosParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let page = params.page.unwrap_or(1);
    let size = params.size.unwrap_or(state.config.default_page_size);
    let filter = TodoFilter {
        weather: params.weather,
        modified_from: params.start_date,
        modified_until: params.end_date,
    };

    let todo_page = state
        .todos
        .list_todos(page, size, filter)
        .await
        .map_err(port_error_response)?;

    Ok(Json(TodoPageResponse::from(todo_page)))
}

/// Fetch a single todo by its identifier.
#[utoipa::path(
    get,
    path = "/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "The identifier of the todo."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the caller."),
        ("x-user-email" = String, Header, description = "The email of the caller.")
    ),
    responses(
        (status = 200, description = "The requested todo", body = TodoResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "No todo with this identifier")
    )
)]
pub async fn get_todo_handler(
    State(state): State<Arc<AppState>>,
    Path(todo_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let todo = state
        .todos
        .get_todo(todo_id)
        .await
        .map_err(port_error_response)?;

    Ok(Json(TodoResponse::from(todo)))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}
