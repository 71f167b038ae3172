//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/get/partial-update/delete over the `tasks` table.
//! - Own idempotent seed inserts and the durable "has seeded" flag.
//!
//! # Invariants
//! - `tasks.id` is unique; new ids are never smaller than any stored id.
//! - `tasks.date` strictly increases with every insert, so newest-first order
//!   is total.
//! - Every statement commits on its own; there is no batching.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{NewTask, Task, TaskId, TaskPatch, DEFAULT_OWNER_ID};
use crate::seed::SeedRecord;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    task_description,
    date,
    is_completed,
    user_id
FROM tasks";

const TASK_COLUMNS: [&str; 6] = [
    "id",
    "title",
    "task_description",
    "date",
    "is_completed",
    "user_id",
];

const SEEDED_FLAG_KEY: &str = "has_loaded_initial_data";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// The stored maximum of `tasks.<column>` leaves no larger value.
    ValueSpaceExhausted(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: expected schema {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::ValueSpaceExhausted(column) => {
                write!(f, "no value left above the largest stored `tasks.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Task store contract.
///
/// Implementations must be consistent with a single writer: every call is
/// applied before the next one starts.
pub trait TaskRepository {
    /// Persists a new task with a fresh id and creation timestamp.
    fn create_task(&self, task: &NewTask) -> RepoResult<Task>;
    /// Returns all tasks, newest first.
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Gets one task by id.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Applies the provided fields only. Returns `false` when `id` is unknown.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<bool>;
    /// Removes every row with `id` and returns how many were removed.
    fn delete_task(&self, id: TaskId) -> RepoResult<usize>;
    /// Inserts a seed record unless its id is already stored.
    fn seed_if_absent(&self, record: &SeedRecord) -> RepoResult<bool>;
    /// Reads the durable one-time seed flag.
    fn is_seeded(&self) -> RepoResult<bool>;
    /// Sets the durable one-time seed flag.
    fn mark_seeded(&self) -> RepoResult<()>;
}

/// SQLite-backed task store.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema does
    ///   not match what this store reads and writes.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Wraps a connection that already passed `try_new` once.
    ///
    /// Skips the schema checks; callers holding a long-lived connection use
    /// this to avoid re-running them on every call.
    pub fn new_verified(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Picks the id for the next user-created task.
    ///
    /// Starts at "now" and is bumped past the stored maximum, which keeps ids
    /// unique even within one millisecond.
    fn next_id(&self) -> RepoResult<TaskId> {
        let max_id: Option<i64> =
            self.conn
                .query_row("SELECT MAX(id) FROM tasks;", [], |row| row.get(0))?;
        bump_past(now_epoch_ms(), max_id, "id")
    }

    /// Picks the creation timestamp for the next insert, strictly after every
    /// stored one so newest-first order is total.
    fn next_created_at(&self) -> RepoResult<i64> {
        let max_date: Option<i64> =
            self.conn
                .query_row("SELECT MAX(date) FROM tasks;", [], |row| row.get(0))?;
        bump_past(now_epoch_ms(), max_date, "date")
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &NewTask) -> RepoResult<Task> {
        let id = self.next_id()?;
        let created_at = self.next_created_at()?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                task_description,
                date,
                is_completed,
                user_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id,
                task.title.as_str(),
                task.description.as_deref(),
                created_at,
                bool_to_int(task.completed),
                DEFAULT_OWNER_ID,
            ],
        )?;

        Ok(Task {
            id,
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.completed,
            owner_id: DEFAULT_OWNER_ID,
            created_at,
        })
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY date DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<bool> {
        if patch.is_empty() {
            return task_exists(self.conn, id);
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(description) = patch.description.as_ref() {
            assignments.push("task_description = ?");
            bind_values.push(description.clone().map_or(Value::Null, Value::Text));
        }
        if let Some(completed) = patch.completed {
            assignments.push("is_completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        bind_values.push(Value::Integer(id));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?;", assignments.join(", "));
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed > 0)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        Ok(removed)
    }

    fn seed_if_absent(&self, record: &SeedRecord) -> RepoResult<bool> {
        let created_at = self.next_created_at()?;
        let inserted = self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                task_description,
                date,
                is_completed,
                user_id
            ) VALUES (?1, ?2, '', ?3, ?4, ?5)
            ON CONFLICT(id) DO NOTHING;",
            params![
                record.id,
                record.title.as_str(),
                created_at,
                bool_to_int(record.completed),
                record.owner_id,
            ],
        )?;
        Ok(inserted == 1)
    }

    fn is_seeded(&self) -> RepoResult<bool> {
        let value: Option<i64> = self
            .conn
            .query_row(
                "SELECT value FROM app_flags WHERE key = ?1;",
                [SEEDED_FLAG_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.is_some_and(|value| value != 0))
    }

    fn mark_seeded(&self) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO app_flags (key, value) VALUES (?1, 1)
             ON CONFLICT(key) DO UPDATE SET value = 1;",
            [SEEDED_FLAG_KEY],
        )?;
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;
    let completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` for task {id}"
            )));
        }
    };

    Ok(Task {
        id,
        title: row.get("title")?,
        description: row.get("task_description")?,
        completed,
        owner_id: row.get("user_id")?,
        created_at: row.get("date")?,
    })
}

fn task_exists(conn: &Connection, id: TaskId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["tasks", "app_flags"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    for column in TASK_COLUMNS {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bump_past(now: i64, stored_max: Option<i64>, column: &'static str) -> RepoResult<i64> {
    match stored_max {
        None => Ok(now),
        Some(max) => max
            .checked_add(1)
            .map(|next| now.max(next))
            .ok_or(RepoError::ValueSpaceExhausted(column)),
    }
}

fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
