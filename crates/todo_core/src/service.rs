//! crates/todo_core/src/service.rs
//!
//! The application service that orchestrates the ports. Each operation is a
//! stateless request/response transaction: derive inputs, call the
//! collaborators, project the result. Upstream failures propagate unchanged.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{AuthUser, NewTodo, Todo, TodoFilter, TodoPage, User};
use crate::ports::{DatabaseService, PortError, PortResult, WeatherService};

/// Orchestrates todo creation and retrieval against the database and weather
/// ports.
#[derive(Clone)]
pub struct TodoService {
    db: Arc<dyn DatabaseService>,
    weather: Arc<dyn WeatherService>,
}

impl TodoService {
    /// Creates a new `TodoService`.
    pub fn new(db: Arc<dyn DatabaseService>, weather: Arc<dyn WeatherService>) -> Self {
        Self { db, weather }
    }

    /// Creates one todo owned by the authenticated caller.
    ///
    /// The weather collaborator is consulted exactly once and its result is
    /// stored verbatim; if the lookup fails the failure propagates with no
    /// retry and no fallback, and nothing is persisted.
    pub async fn create_todo(&self, auth_user: &AuthUser, new_todo: NewTodo) -> PortResult<Todo> {
        let owner = User::from_auth_user(auth_user);

        let weather = self.weather.today_weather().await?;

        self.db.insert_todo(new_todo, weather, owner).await
    }

    /// Lists todos matching the optional filters, most recently modified
    /// first, together with the page-invariant total count.
    ///
    /// `page` is 1-based; non-positive page numbers or sizes are rejected
    /// before any query runs.
    pub async fn list_todos(
        &self,
        page: i64,
        size: i64,
        filter: TodoFilter,
    ) -> PortResult<TodoPage> {
        if page < 1 {
            return Err(PortError::InvalidRequest(format!(
                "page must be 1 or greater, got {page}"
            )));
        }
        if size < 1 {
            return Err(PortError::InvalidRequest(format!(
                "size must be 1 or greater, got {size}"
            )));
        }

        let offset = (page - 1) * size;

        let items = self.db.list_todos(&filter, offset, size).await?;
        let total_count = self.db.count_todos(&filter).await?;

        Ok(TodoPage {
            items,
            page,
            size,
            total_count,
        })
    }

    /// Fetches a single todo joined with its owner.
    pub async fn get_todo(&self, todo_id: Uuid) -> PortResult<Todo> {
        self.db
            .find_todo_with_owner(todo_id)
            .await?
            .ok_or_else(|| PortError::NotFound("Todo not found".to_string()))
    }
}
