//! crates/todo_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewTodo, Todo, TodoFilter, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    /// Persists a new todo owned by `owner` and returns it with its assigned
    /// identifier and timestamps.
    ///
    /// Runs as a single all-or-nothing unit of work; no partial record may
    /// survive a failure.
    async fn insert_todo(&self, new_todo: NewTodo, weather: String, owner: User)
        -> PortResult<Todo>;

    /// Fetches one todo joined eagerly with its owner, or `None` when no
    /// record matches.
    async fn find_todo_with_owner(&self, todo_id: Uuid) -> PortResult<Option<Todo>>;

    /// Fetches at most `limit` todos matching `filter`, ordered by
    /// last-modified timestamp descending, starting at `offset`.
    async fn list_todos(&self, filter: &TodoFilter, offset: i64, limit: i64)
        -> PortResult<Vec<Todo>>;

    /// Counts every record matching `filter`. Must apply the exact predicate
    /// used by [`DatabaseService::list_todos`] so paging never changes the count.
    async fn count_todos(&self, filter: &TodoFilter) -> PortResult<i64>;
}

#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Returns the current-day weather descriptor as an opaque string.
    async fn today_weather(&self) -> PortResult<String>;
}
