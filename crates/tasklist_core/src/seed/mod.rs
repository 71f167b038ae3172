//! One-time seed data import.
//!
//! # Responsibility
//! - Parse the bundled `todos` JSON resource into seed records.
//! - Provide the single, flag-guarded seeding entry point.
//!
//! # Invariants
//! - Seeding never duplicates an id that is already stored.
//! - The "has seeded" flag is set only after every record was processed.
//! - A missing or malformed resource never aborts startup.

mod bootstrap;
mod loader;

pub use bootstrap::{ensure_seeded, SeedOutcome};
pub use loader::{load_seed, parse_seed, SeedError, SeedRecord, SeedResult, SeedSource};
