use rusqlite::Connection;
use std::collections::HashSet;
use tasklist_core::db::migrations::latest_version;
use tasklist_core::db::open_db_in_memory;
use tasklist_core::{
    NewTask, RepoError, SeedRecord, SqliteTaskRepository, TaskPatch, TaskRepository,
    DEFAULT_OWNER_ID,
};

#[test]
fn create_assigns_id_timestamp_and_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let created = repo
        .create_task(&NewTask::new("Write report").with_description(Some("Q3".to_string())))
        .unwrap();
    assert_eq!(created.title, "Write report");
    assert_eq!(created.description.as_deref(), Some("Q3"));
    assert!(!created.completed);
    assert_eq!(created.owner_id, DEFAULT_OWNER_ID);
    assert!(created.id > 0);

    let loaded = repo.get_task(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);

    let done = repo.create_task(&NewTask::new("Already done").completed(true)).unwrap();
    assert!(repo.get_task(done.id).unwrap().unwrap().completed);
}

#[test]
fn description_keeps_absent_distinct_from_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let absent = repo.create_task(&NewTask::new("absent")).unwrap();
    let empty = repo
        .create_task(&NewTask::new("empty").with_description(Some(String::new())))
        .unwrap();

    assert_eq!(repo.get_task(absent.id).unwrap().unwrap().description, None);
    assert_eq!(
        repo.get_task(empty.id).unwrap().unwrap().description,
        Some(String::new())
    );
}

#[test]
fn rapid_creates_get_unique_ids_and_newest_first_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let created: Vec<_> = (0..20)
        .map(|index| repo.create_task(&NewTask::new(format!("task {index}"))).unwrap())
        .collect();

    let listed = repo.list_tasks().unwrap();
    let ids: HashSet<_> = listed.iter().map(|task| task.id).collect();
    assert_eq!(ids.len(), 20);

    let expected: Vec<_> = created.iter().rev().map(|task| task.id).collect();
    let actual: Vec<_> = listed.iter().map(|task| task.id).collect();
    assert_eq!(actual, expected);
}

#[test]
fn partial_update_only_touches_given_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let original = repo
        .create_task(&NewTask::new("draft").with_description(Some("details".to_string())))
        .unwrap();

    let found = repo
        .update_task(
            original.id,
            &TaskPatch {
                completed: Some(true),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert!(found);

    let loaded = repo.get_task(original.id).unwrap().unwrap();
    assert!(loaded.completed);
    assert_eq!(loaded.title, "draft");
    assert_eq!(loaded.description.as_deref(), Some("details"));
    assert_eq!(loaded.created_at, original.created_at);
}

#[test]
fn update_can_clear_description() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = repo
        .create_task(&NewTask::new("t").with_description(Some("d".to_string())))
        .unwrap();

    repo.update_task(
        task.id,
        &TaskPatch {
            description: Some(None),
            ..TaskPatch::default()
        },
    )
    .unwrap();

    assert_eq!(repo.get_task(task.id).unwrap().unwrap().description, None);
}

#[test]
fn update_unknown_id_reports_false_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let patch = TaskPatch {
        title: Some("ghost".to_string()),
        ..TaskPatch::default()
    };
    assert!(!repo.update_task(42, &patch).unwrap());
    assert!(!repo.update_task(42, &TaskPatch::default()).unwrap());
    assert!(repo.list_tasks().unwrap().is_empty());
}

#[test]
fn delete_is_noop_for_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let task = repo.create_task(&NewTask::new("gone soon")).unwrap();

    assert_eq!(repo.delete_task(task.id).unwrap(), 1);
    assert_eq!(repo.delete_task(task.id).unwrap(), 0);
    assert!(repo.get_task(task.id).unwrap().is_none());
}

#[test]
fn seed_if_absent_skips_existing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let record = SeedRecord {
        id: 5,
        title: "seeded".to_string(),
        completed: true,
        owner_id: 26,
    };

    assert!(repo.seed_if_absent(&record).unwrap());
    assert!(!repo.seed_if_absent(&record).unwrap());

    let stored = repo.get_task(5).unwrap().unwrap();
    assert_eq!(stored.title, "seeded");
    assert_eq!(stored.description.as_deref(), Some(""));
    assert!(stored.completed);
    assert_eq!(stored.owner_id, 26);
    assert_eq!(repo.list_tasks().unwrap().len(), 1);
}

#[test]
fn created_ids_never_collide_with_seeded_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let far_future = i64::MAX / 2;
    repo.seed_if_absent(&SeedRecord {
        id: far_future,
        title: "future".to_string(),
        completed: false,
        owner_id: 1,
    })
    .unwrap();

    let created = repo.create_task(&NewTask::new("after")).unwrap();
    assert_eq!(created.id, far_future + 1);
}

#[test]
fn create_fails_cleanly_when_no_id_is_left_above_seeded_max() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    assert!(repo
        .seed_if_absent(&SeedRecord {
            id: i64::MAX,
            title: "last".to_string(),
            completed: false,
            owner_id: 1,
        })
        .unwrap());

    let err = repo.create_task(&NewTask::new("overflow")).unwrap_err();
    assert!(matches!(err, RepoError::ValueSpaceExhausted("id")));
    assert_eq!(repo.list_tasks().unwrap().len(), 1);

    // Seeding other ids only needs a timestamp, so it still works.
    assert!(repo
        .seed_if_absent(&SeedRecord {
            id: 7,
            title: "seven".to_string(),
            completed: false,
            owner_id: 1,
        })
        .unwrap());
}

#[test]
fn insert_fails_cleanly_when_no_timestamp_is_left() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let created = repo.create_task(&NewTask::new("stamped")).unwrap();
    conn.execute(
        "UPDATE tasks SET date = ?1 WHERE id = ?2;",
        rusqlite::params![i64::MAX, created.id],
    )
    .unwrap();

    let err = repo.create_task(&NewTask::new("later")).unwrap_err();
    assert!(matches!(err, RepoError::ValueSpaceExhausted("date")));
    let err = repo
        .seed_if_absent(&SeedRecord {
            id: 1,
            title: "seeded".to_string(),
            completed: false,
            owner_id: 1,
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::ValueSpaceExhausted("date")));
    assert_eq!(repo.list_tasks().unwrap().len(), 1);
}

#[test]
fn seed_flag_is_durable_in_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flags.sqlite3");
    {
        let conn = tasklist_core::db::open_db(&path).unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        assert!(!repo.is_seeded().unwrap());
        repo.mark_seeded().unwrap();
        repo.mark_seeded().unwrap();
    }

    let conn = tasklist_core::db::open_db(&path).unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    assert!(repo.is_seeded().unwrap());
}

#[test]
fn invalid_completion_value_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO tasks (id, title, task_description, date, is_completed, user_id)
         VALUES (1, 'broken', NULL, 1, 7, 1);",
    )
    .unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let err = repo.list_tasks().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTaskRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_task_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE tasks (id INTEGER PRIMARY KEY, title TEXT NOT NULL);
         CREATE TABLE app_flags (key TEXT PRIMARY KEY, value INTEGER NOT NULL);",
    )
    .unwrap();
    conn.pragma_update(None, "user_version", latest_version())
        .unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "tasks",
            column: "task_description"
        })
    ));
}

#[test]
fn verified_repository_reuses_a_checked_connection() {
    let conn = open_db_in_memory().unwrap();
    SqliteTaskRepository::try_new(&conn).unwrap();

    let first = SqliteTaskRepository::new_verified(&conn);
    let created = first.create_task(&NewTask::new("kept")).unwrap();

    let second = SqliteTaskRepository::new_verified(&conn);
    assert_eq!(second.get_task(created.id).unwrap(), Some(created));
}
