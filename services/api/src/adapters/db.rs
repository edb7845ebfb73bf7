//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! The list query is assembled dynamically: every optional filter that is
//! present contributes one conjunctive clause, and absent filters contribute
//! nothing at all. The count query reuses the same clause builder so both
//! queries always agree on the predicate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use todo_core::domain::{NewTodo, Todo, TodoFilter, User};
use todo_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

/// Columns selected whenever a todo row is fetched joined with its owner.
const TODO_WITH_OWNER_COLUMNS: &str = "t.id, t.title, t.contents, t.weather, \
     t.created_at, t.modified_at, u.id AS owner_id, u.email AS owner_email";

#[derive(FromRow)]
struct TodoWithOwnerRecord {
    id: Uuid,
    title: String,
    contents: String,
    weather: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_email: String,
}

impl TodoWithOwnerRecord {
    fn into_domain(self) -> Todo {
        Todo {
            id: self.id,
            title: self.title,
            contents: self.contents,
            weather: self.weather,
            owner: User {
                id: self.owner_id,
                email: self.owner_email,
            },
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

#[derive(FromRow)]
struct InsertedTodoRecord {
    id: Uuid,
    title: String,
    contents: String,
    weather: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl InsertedTodoRecord {
    fn into_domain(self, owner: User) -> Todo {
        Todo {
            id: self.id,
            title: self.title,
            contents: self.contents,
            weather: self.weather,
            owner,
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

//=========================================================================================
// Dynamic Predicate Assembly
//=========================================================================================

/// Appends one conjunctive `WHERE` clause per present filter.
///
/// An absent filter emits no clause; an empty weather string is treated as
/// absent. The queries built from this share bind-parameter order, so the
/// list and count queries stay consistent by construction.
fn push_filter_clauses(builder: &mut QueryBuilder<'_, Postgres>, filter: &TodoFilter) {
    let mut prefix = " WHERE ";

    if let Some(weather) = filter.weather.as_deref().filter(|w| !w.is_empty()) {
        builder.push(prefix).push("t.weather = ").push_bind(weather.to_owned());
        prefix = " AND ";
    }
    if let Some(from) = filter.modified_from {
        builder.push(prefix).push("t.modified_at >= ").push_bind(from);
        prefix = " AND ";
    }
    if let Some(until) = filter.modified_until {
        builder.push(prefix).push("t.modified_at <= ").push_bind(until);
    }
}

fn list_query<'a>(filter: &TodoFilter) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {TODO_WITH_OWNER_COLUMNS} FROM todos t JOIN users u ON u.id = t.owner_id"
    ));
    push_filter_clauses(&mut builder, filter);
    builder.push(" ORDER BY t.modified_at DESC");
    builder
}

fn count_query<'a>(filter: &TodoFilter) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM todos t");
    push_filter_clauses(&mut builder, filter);
    builder
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn insert_todo(
        &self,
        new_todo: NewTodo,
        weather: String,
        owner: User,
    ) -> PortResult<Todo> {
        // One transaction for the owner upsert and the insert, so a failure
        // after the weather lookup leaves no partial record behind.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // The owner reference comes straight from the session context; the
        // row is provisioned on first write and existing rows are untouched.
        sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(owner.id)
            .bind(&owner.email)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record = sqlx::query_as::<_, InsertedTodoRecord>(
            "INSERT INTO todos (id, title, contents, weather, owner_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, title, contents, weather, created_at, modified_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_todo.title)
        .bind(&new_todo.contents)
        .bind(&weather)
        .bind(owner.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.into_domain(owner))
    }

    async fn find_todo_with_owner(&self, todo_id: Uuid) -> PortResult<Option<Todo>> {
        let record = sqlx::query_as::<_, TodoWithOwnerRecord>(&format!(
            "SELECT {TODO_WITH_OWNER_COLUMNS} FROM todos t \
             JOIN users u ON u.id = t.owner_id WHERE t.id = $1"
        ))
        .bind(todo_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.map(TodoWithOwnerRecord::into_domain))
    }

    async fn list_todos(
        &self,
        filter: &TodoFilter,
        offset: i64,
        limit: i64,
    ) -> PortResult<Vec<Todo>> {
        let mut builder = list_query(filter);
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let records = builder
            .build_query_as::<TodoWithOwnerRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(TodoWithOwnerRecord::into_domain).collect())
    }

    async fn count_todos(&self, filter: &TodoFilter) -> PortResult<i64> {
        let total = count_query(filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_filter_emits_no_where_clause() {
        let builder = count_query(&TodoFilter::default());
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM todos t");
    }

    #[test]
    fn empty_weather_string_is_treated_as_absent() {
        let filter = TodoFilter {
            weather: Some(String::new()),
            ..TodoFilter::default()
        };
        let builder = count_query(&filter);
        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM todos t");
    }

    #[test]
    fn weather_filter_emits_a_single_equality_clause() {
        let filter = TodoFilter {
            weather: Some("Sunny".to_string()),
            ..TodoFilter::default()
        };
        let builder = count_query(&filter);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM todos t WHERE t.weather = $1"
        );
    }

    #[test]
    fn date_bounds_emit_inclusive_range_clauses() {
        let filter = TodoFilter {
            weather: None,
            modified_from: Some(timestamp()),
            modified_until: Some(timestamp()),
        };
        let builder = count_query(&filter);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM todos t WHERE t.modified_at >= $1 AND t.modified_at <= $2"
        );
    }

    #[test]
    fn all_filters_join_conjunctively_in_order() {
        let filter = TodoFilter {
            weather: Some("Rain".to_string()),
            modified_from: Some(timestamp()),
            modified_until: Some(timestamp()),
        };
        let builder = count_query(&filter);
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM todos t WHERE t.weather = $1 \
             AND t.modified_at >= $2 AND t.modified_at <= $3"
        );
    }

    #[test]
    fn list_query_orders_by_modified_at_descending() {
        let builder = list_query(&TodoFilter::default());
        let sql = builder.sql();
        assert!(sql.ends_with(" ORDER BY t.modified_at DESC"), "got: {sql}");
        assert!(sql.contains("JOIN users u ON u.id = t.owner_id"));
    }

    #[test]
    fn count_query_shares_the_list_predicate() {
        let filter = TodoFilter {
            weather: Some("Snow".to_string()),
            modified_from: Some(timestamp()),
            modified_until: None,
        };
        let list_sql = list_query(&filter).sql().to_string();
        let count_sql = count_query(&filter).sql().to_string();

        let clause = "WHERE t.weather = $1 AND t.modified_at >= $2";
        assert!(list_sql.contains(clause), "got: {list_sql}");
        assert!(count_sql.contains(clause), "got: {count_sql}");
    }
}
