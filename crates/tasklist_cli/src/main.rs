//! CLI smoke entry point.
//!
//! Usage: `tasklist_cli [DB_PATH] [SEED_PATH]`
//!
//! Opens the task store (in-memory when `DB_PATH` is omitted), seeds it from
//! `SEED_PATH` or the bundled resource, and prints the resulting list.

use std::error::Error;
use std::process::ExitCode;
use tasklist_core::db::{open_db, open_db_in_memory};
use tasklist_core::{
    core_version, format_task_date, SeedSource, SqliteTaskRepository, TaskListManager,
};

const BUNDLED_SEED: &str = include_str!("../resources/todos.json");

fn main() -> ExitCode {
    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tasklist_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let conn = match args.first() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let seed = match args.get(1) {
        Some(path) => SeedSource::File(path.into()),
        None => SeedSource::Inline(BUNDLED_SEED.to_string()),
    };

    let repo = SqliteTaskRepository::try_new(&conn)?;
    let mut list = TaskListManager::new(repo).with_seed_source(seed);
    list.refresh()?;

    let summary = list.summary();
    println!("tasklist_core version={}", core_version());
    println!(
        "tasks total={} completed={} pending={}",
        summary.total, summary.completed, summary.pending
    );
    for task in list.tasks() {
        let mark = if task.completed { "x" } else { " " };
        println!(
            "[{mark}] {} {} {}",
            task.id,
            format_task_date(task.created_at),
            task.title
        );
    }
    Ok(())
}
