use std::path::PathBuf;
use tasklist_core::db::open_db_in_memory;
use tasklist_core::{
    ensure_seeded, load_seed, SeedError, SeedOutcome, SeedSource, SqliteTaskRepository,
    TaskRepository,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/todos.json")
}

#[test]
fn load_seed_reads_bundled_fixture() {
    let records = load_seed(fixture_path()).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].id, 2);
    assert_eq!(records[1].title, "Memorize a poem");
    assert!(records[1].completed);
    assert_eq!(records[1].owner_id, 13);
}

#[test]
fn load_seed_reports_malformed_json_as_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.json");
    std::fs::write(&path, "{\"todos\": [ {\"id\": 1 ").unwrap();

    assert!(matches!(load_seed(&path), Err(SeedError::Parse(_))));
}

#[test]
fn ensure_seeded_imports_once_and_sets_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let source = SeedSource::File(fixture_path());

    let first = ensure_seeded(&repo, &source).unwrap();
    assert_eq!(
        first,
        SeedOutcome::Seeded {
            inserted: 3,
            skipped: 0
        }
    );
    assert!(repo.is_seeded().unwrap());

    let second = ensure_seeded(&repo, &source).unwrap();
    assert_eq!(second, SeedOutcome::AlreadySeeded);
    assert_eq!(repo.list_tasks().unwrap().len(), 3);
}

#[test]
fn seeding_twice_without_flag_yields_same_contents() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let source = SeedSource::File(fixture_path());

    ensure_seeded(&repo, &source).unwrap();
    let once: Vec<_> = repo
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| (task.id, task.title, task.completed))
        .collect();

    conn.execute("DELETE FROM app_flags;", []).unwrap();
    let outcome = ensure_seeded(&repo, &source).unwrap();
    assert_eq!(
        outcome,
        SeedOutcome::Seeded {
            inserted: 0,
            skipped: 3
        }
    );

    let twice: Vec<_> = repo
        .list_tasks()
        .unwrap()
        .into_iter()
        .map(|task| (task.id, task.title, task.completed))
        .collect();
    assert_eq!(once, twice);
}

#[test]
fn missing_resource_degrades_to_empty_store_and_keeps_flag_unset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let source = SeedSource::File(dir.path().join("missing.json"));

    let outcome = ensure_seeded(&repo, &source).unwrap();
    assert_eq!(outcome, SeedOutcome::Unavailable);
    assert!(!repo.is_seeded().unwrap());
    assert!(repo.list_tasks().unwrap().is_empty());
}

#[test]
fn malformed_inline_resource_is_unavailable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let outcome = ensure_seeded(&repo, &SeedSource::Inline("not json".to_string())).unwrap();
    assert_eq!(outcome, SeedOutcome::Unavailable);
    assert!(!repo.is_seeded().unwrap());
}
