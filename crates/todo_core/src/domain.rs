//! crates/todo_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a single task entry.
///
/// The weather string is a snapshot captured when the todo was created and is
/// never recomputed for existing records.
#[derive(Debug, Clone)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub contents: String,
    pub weather: String,
    pub owner: User,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Represents the account that owns todos. Many todos reference one user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

impl User {
    /// Converts the authenticated-session context into an owner reference.
    ///
    /// Pure mapping, no database round-trip; the identifier embedded in the
    /// session context is trusted.
    pub fn from_auth_user(auth_user: &AuthUser) -> Self {
        Self {
            id: auth_user.id,
            email: auth_user.email.clone(),
        }
    }
}

/// The identity of the current caller, validated upstream of this crate.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// The caller-supplied fields of a todo that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub contents: String,
}

/// Optional filters for the list query, combined conjunctively.
///
/// An absent filter emits no clause at all; it is not converted into a
/// vacuous comparison.
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    /// Exact match on the weather snapshot. Empty strings are ignored.
    pub weather: Option<String>,
    /// Inclusive lower bound on the last-modified timestamp.
    pub modified_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the last-modified timestamp.
    pub modified_until: Option<DateTime<Utc>>,
}

/// One page of todos together with the paging inputs and the total number of
/// records matching the same filter.
#[derive(Debug, Clone)]
pub struct TodoPage {
    pub items: Vec<Todo>,
    pub page: i64,
    pub size: i64,
    pub total_count: i64,
}
