//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list manager operations as stable, sync functions via FRB.
//! - Keep one process-wide store session so the cached list survives calls.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures come back as envelopes with `ok=false` and a message; list
//!   reads fail open to an empty list.

use log::warn;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version as core_version_inner, format_task_date, init_logging as init_logging_inner,
    share_text, ListResult, SeedSource, SqliteTaskRepository, Task, TaskListManager,
    TaskSummary,
};

const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";
const DB_PATH_ENV: &str = "TASKLIST_DB_PATH";
const SEED_PATH_ENV: &str = "TASKLIST_SEED_PATH";

static STORE_CONFIG: OnceLock<StoreConfig> = OnceLock::new();
static SESSION: Mutex<Option<StoreSession>> = Mutex::new(None);

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoreConfig {
    db_path: PathBuf,
    seed_path: Option<PathBuf>,
}

struct StoreSession {
    conn: Connection,
    cached: Vec<Task>,
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking. Never throws.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets the database file and optional bundled seed file paths.
///
/// Must be called before the first task call. Without it, paths come from
/// `TASKLIST_DB_PATH`/`TASKLIST_SEED_PATH` or a temp-dir database.
///
/// # FFI contract
/// - Repeating the same configuration is accepted.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(db_path: String, seed_path: Option<String>) -> String {
    let db_path = db_path.trim();
    if db_path.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let config = StoreConfig {
        db_path: PathBuf::from(db_path),
        seed_path: seed_path
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from),
    };

    let active = STORE_CONFIG.get_or_init(|| config.clone());
    if *active == config {
        String::new()
    } else {
        format!(
            "store already configured at `{}`; refusing to switch to `{}`",
            active.db_path.display(),
            config.db_path.display()
        )
    }
}

/// Task row shaped for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at_ms: i64,
    /// `dd/MM/yy` label for the row.
    pub date_label: String,
}

/// List envelope returned by refresh and search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub total: u32,
    pub completed: u32,
    pub message: String,
}

/// Envelope for single-task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub task: Option<TaskItem>,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<TaskItem>) -> Self {
        Self {
            ok: true,
            task,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// Loads the list, seeding an empty first-run store.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_refresh() -> TaskListResponse {
    list_response(
        "tasks_refresh",
        with_task_list(|list| list.refresh().map(<[Task]>::to_vec)),
    )
}

/// Filters the list by title; empty text returns every task.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_search(text: String) -> TaskListResponse {
    list_response(
        "tasks_search",
        with_task_list(|list| list.search(text.as_str()).map(<[Task]>::to_vec)),
    )
}

/// Flips the completion flag of a listed task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: i64) -> TaskActionResponse {
    match with_task_list(|list| list.toggle_completion(id)) {
        Ok(task) => TaskActionResponse::success("Task updated.", Some(to_task_item(&task))),
        Err(err) => TaskActionResponse::failure(format!("task_toggle failed: {err}")),
    }
}

/// Creates a task at the top of the list.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(title: String, description: Option<String>) -> TaskActionResponse {
    match with_task_list(|list| list.add(title.trim().to_string(), description)) {
        Ok(task) => TaskActionResponse::success("Task created.", Some(to_task_item(&task))),
        Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Edits title and, when given, description of a task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(id: i64, title: String, description: Option<String>) -> TaskActionResponse {
    match with_task_list(|list| list.update(id, title.trim().to_string(), description)) {
        Ok(task) => TaskActionResponse::success("Task updated.", Some(to_task_item(&task))),
        Err(err) => TaskActionResponse::failure(format!("task_update failed: {err}")),
    }
}

/// Deletes a task. Unknown ids succeed as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn task_remove(id: i64) -> TaskActionResponse {
    match with_task_list(|list| list.remove(id)) {
        Ok(true) => TaskActionResponse::success("Task deleted.", None),
        Ok(false) => TaskActionResponse::success("Task already deleted.", None),
        Err(err) => TaskActionResponse::failure(format!("task_remove failed: {err}")),
    }
}

/// Plain-text summary of a listed task for the share sheet.
///
/// Returns `None` when the task is not in the current list.
#[flutter_rust_bridge::frb(sync)]
pub fn task_share_text(id: i64) -> Option<String> {
    with_task_list(|list| Ok(list.get(id).map(share_text)))
        .ok()
        .flatten()
}

fn list_response(operation: &str, result: Result<Vec<Task>, String>) -> TaskListResponse {
    match result {
        Ok(tasks) => {
            let summary = TaskSummary::from_tasks(&tasks);
            TaskListResponse {
                ok: true,
                items: tasks.iter().map(to_task_item).collect(),
                total: count_to_u32(summary.total),
                completed: count_to_u32(summary.completed),
                message: format!("Loaded {} task(s).", summary.total),
            }
        }
        Err(err) => {
            warn!("event=ffi_list module=ffi status=error operation={operation}");
            TaskListResponse {
                ok: false,
                items: Vec::new(),
                total: 0,
                completed: 0,
                message: format!("{operation} failed: {err}"),
            }
        }
    }
}

fn with_task_list<T>(
    f: impl FnOnce(&mut TaskListManager<SqliteTaskRepository<'_>>) -> ListResult<T>,
) -> Result<T, String> {
    let mut guard = SESSION
        .lock()
        .map_err(|_| "task session lock poisoned".to_string())?;
    if guard.is_none() {
        *guard = Some(open_session()?);
    }
    let Some(session) = guard.as_mut() else {
        return Err("task session unavailable".to_string());
    };

    let repo = SqliteTaskRepository::new_verified(&session.conn);
    let mut list = TaskListManager::resume(repo, std::mem::take(&mut session.cached));
    if let Some(seed_path) = resolve_store_config().seed_path.clone() {
        list = list.with_seed_source(SeedSource::File(seed_path));
    }

    let result = f(&mut list);
    session.cached = list.into_cached();
    result.map_err(|err| err.to_string())
}

fn open_session() -> Result<StoreSession, String> {
    open_session_at(&resolve_store_config().db_path)
}

/// Opens the database and checks its schema once for the whole session.
fn open_session_at(db_path: &Path) -> Result<StoreSession, String> {
    let conn = open_db(db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    SqliteTaskRepository::try_new(&conn)
        .map_err(|err| format!("task repo init failed: {err}"))?;
    Ok(StoreSession {
        conn,
        cached: Vec::new(),
    })
}

fn resolve_store_config() -> &'static StoreConfig {
    STORE_CONFIG.get_or_init(|| StoreConfig {
        db_path: env_path(DB_PATH_ENV)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
        seed_path: env_path(SEED_PATH_ENV),
    })
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id,
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
        created_at_ms: task.created_at,
        date_label: format_task_date(task.created_at),
    }
}

fn count_to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
