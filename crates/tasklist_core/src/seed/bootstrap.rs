//! Flag-guarded seeding entry point.

use super::loader::SeedSource;
use crate::repo::task_repo::{RepoResult, TaskRepository};
use log::{info, warn};
use std::time::Instant;

/// Result of one `ensure_seeded` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The flag was already set; nothing was read or written.
    AlreadySeeded,
    /// Seed data was imported and the flag is now set.
    Seeded { inserted: usize, skipped: usize },
    /// The resource could not be loaded; the flag stays unset.
    Unavailable,
}

/// Imports seed data once per database.
///
/// Safe to call from every startup path: the persisted flag makes repeated
/// calls no-ops, and ids that already exist are skipped even if the flag was
/// lost.
///
/// # Errors
/// Returns store errors. A missing or malformed resource is not an error; it
/// is logged and reported as `SeedOutcome::Unavailable`.
pub fn ensure_seeded<R: TaskRepository + ?Sized>(
    repo: &R,
    source: &SeedSource,
) -> RepoResult<SeedOutcome> {
    if repo.is_seeded()? {
        info!("event=seed module=seed status=skip reason=already_seeded");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let started_at = Instant::now();
    let records = match source.load() {
        Ok(records) => records,
        Err(err) => {
            warn!(
                "event=seed module=seed status=error source={} error_code=seed_unavailable error={err}",
                source.kind()
            );
            return Ok(SeedOutcome::Unavailable);
        }
    };

    let mut inserted = 0;
    let mut skipped = 0;
    for record in &records {
        if repo.seed_if_absent(record)? {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }
    repo.mark_seeded()?;

    info!(
        "event=seed module=seed status=ok source={} inserted={inserted} skipped={skipped} duration_ms={}",
        source.kind(),
        started_at.elapsed().as_millis()
    );
    Ok(SeedOutcome::Seeded { inserted, skipped })
}
