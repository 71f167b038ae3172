//! Seed resource parsing.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub type SeedResult<T> = Result<T, SeedError>;

/// Failure while reading the seed resource.
#[derive(Debug)]
pub enum SeedError {
    /// Resource does not exist at the configured location.
    NotFound(PathBuf),
    /// Resource exists but could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Resource content is not a valid `todos` document.
    Parse(serde_json::Error),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "seed resource not found: {}", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to read seed resource `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed seed resource: {err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Transient seed row, converted into a stored task right away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRecord {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub owner_id: i64,
}

/// Where seed data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// JSON file bundled next to the application.
    File(PathBuf),
    /// JSON document already in memory, e.g. via `include_str!`.
    Inline(String),
}

impl SeedSource {
    /// Reads and parses the resource.
    pub fn load(&self) -> SeedResult<Vec<SeedRecord>> {
        match self {
            Self::File(path) => load_seed(path),
            Self::Inline(text) => parse_seed(text),
        }
    }

    /// Short label for log lines.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Inline(_) => "inline",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeedDocument {
    todos: Vec<SeedItem>,
}

#[derive(Debug, Deserialize)]
struct SeedItem {
    id: i64,
    todo: String,
    completed: bool,
    #[serde(rename = "userId")]
    user_id: i64,
}

impl From<SeedItem> for SeedRecord {
    fn from(item: SeedItem) -> Self {
        Self {
            id: item.id,
            title: item.todo,
            completed: item.completed,
            owner_id: item.user_id,
        }
    }
}

/// Reads a seed file from disk.
///
/// # Errors
/// - `SeedError::NotFound` when the file does not exist.
/// - `SeedError::Io` for other read failures.
/// - `SeedError::Parse` when the content is malformed.
pub fn load_seed(path: impl AsRef<Path>) -> SeedResult<Vec<SeedRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SeedError::NotFound(path.to_path_buf()),
        _ => SeedError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    parse_seed(&text)
}

/// Parses a `{"todos": [...]}` document.
///
/// Unknown top-level fields such as `total`, `skip` and `limit` are ignored.
pub fn parse_seed(text: &str) -> SeedResult<Vec<SeedRecord>> {
    let document: SeedDocument = serde_json::from_str(text)?;
    Ok(document.todos.into_iter().map(SeedRecord::from).collect())
}
