//! Content repository access.
//!
//! The pipeline reads its content through the [`ContentSource`] trait: a
//! single query returning an ordered snapshot of [`ContentEntry`] records.
//! That fetch is the only suspension point of a build. Everything after it
//! works on the immutable [`Snapshot`].
//!
//! ## File-Backed Store
//!
//! [`JsonContentStore`] is the repository used by the CLI. It accepts either
//! a single snapshot file or a directory of entry files:
//!
//! ```text
//! content.json                     # { "entries": [ {...}, {...} ] } or [ {...} ]
//!
//! content/                         # or one entry (or array of entries) per file
//! ├── 2024-03-01-hello.json
//! └── travel/
//!     └── kyoto.json
//! ```
//!
//! An entry record:
//!
//! ```json
//! {
//!   "id": "a1", "slug": "/hello", "title": "Hello", "date": "2024-03-01",
//!   "draft": false, "private": false, "link": null, "featured": true,
//!   "category": { "id": "c1", "name": "Travel", "slug": "travel" },
//!   "tags": [ { "id": "t1" }, null ],
//!   "author": { "id": "u1", "name": "Ann", "slug": "ann" }
//! }
//! ```
//!
//! Dates are RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
//!
//! ## Data Quality
//!
//! A record whose date is missing or cannot be parsed is excluded from the
//! snapshot and reported as an [`EntryIssue`] instead of being silently
//! mis-ordered. So is a record that does not decode as an entry at all.
//! Unknown attributes are ignored. Only a file that is not valid JSON, or
//! whose top level is neither an object nor an array, fails the whole fetch.

use crate::types::{Author, BuildTimestamp, Category, ContentEntry, Tag};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Unexpected content layout in {path}: expected an entry, an array of entries, or {{\"entries\": [...]}}")]
    UnexpectedLayout { path: PathBuf },
}

/// A per-entry problem that excludes the entry without aborting the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryIssue {
    pub id: String,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// The date field could not be parsed; the raw value is kept for the report.
    MalformedDate(String),
    /// The entry is eligible for its own page but has no slug to place it at.
    MissingSlug,
    /// The slug contains `.` or `..` segments or a backslash.
    InvalidSlug(String),
    /// The record does not decode as an entry.
    MalformedRecord(String),
}

impl std::fmt::Display for EntryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            IssueKind::MalformedDate(raw) => {
                write!(f, "{}: malformed date {raw:?}, entry excluded", self.id)
            }
            IssueKind::MissingSlug => write!(f, "{}: no slug, page not created", self.id),
            IssueKind::InvalidSlug(raw) => {
                write!(f, "{}: invalid slug {raw:?}, page not created", self.id)
            }
            IssueKind::MalformedRecord(reason) => {
                write!(f, "{}: malformed record ({reason}), entry excluded", self.id)
            }
        }
    }
}

/// Result of a content query: ordered entries plus excluded-record reports.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub entries: Vec<ContentEntry>,
    pub issues: Vec<EntryIssue>,
}

/// Sort order supported by the content query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Store order, untouched.
    Unsorted,
    /// Newest first; equal dates by title, then id.
    #[default]
    DateDescTitleAsc,
}

/// Filter, sort, and window parameters of a content query.
///
/// Used both by [`ContentSource::fetch`] and in memory by the collection
/// pipelines, which re-derive their own subsets from the fetched snapshot.
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    pub exclude_drafts: bool,
    pub exclude_private: bool,
    /// Keep only entries dated at or before this instant.
    pub published_before: Option<BuildTimestamp>,
    pub category_slug: Option<String>,
    pub author_slug: Option<String>,
    pub tag_id: Option<String>,
    pub sort: SortOrder,
    pub limit: Option<usize>,
    pub skip: usize,
}

impl ContentQuery {
    /// Everything in the store, in canonical order.
    pub fn all() -> Self {
        Self::default()
    }

    /// Entries a listing may show: not draft, not private, not future-dated.
    pub fn published(now: BuildTimestamp) -> Self {
        Self {
            exclude_drafts: true,
            exclude_private: true,
            published_before: Some(now),
            ..Self::default()
        }
    }

    pub fn in_category(mut self, slug: impl Into<String>) -> Self {
        self.category_slug = Some(slug.into());
        self
    }

    pub fn by_author(mut self, slug: impl Into<String>) -> Self {
        self.author_slug = Some(slug.into());
        self
    }

    pub fn tagged(mut self, tag_id: impl Into<String>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Whether a single entry passes every filter of this query.
    pub fn matches(&self, entry: &ContentEntry) -> bool {
        if self.exclude_drafts && entry.draft {
            return false;
        }
        if self.exclude_private && entry.private {
            return false;
        }
        if let Some(now) = self.published_before
            && entry.date > now.instant()
        {
            return false;
        }
        if let Some(slug) = &self.category_slug
            && entry.category.as_ref().map(|c| &c.slug) != Some(slug)
        {
            return false;
        }
        if let Some(slug) = &self.author_slug
            && entry.author.as_ref().map(|a| &a.slug) != Some(slug)
        {
            return false;
        }
        if let Some(tag_id) = &self.tag_id
            && !entry.tags.iter().flatten().any(|t| &t.id == tag_id)
        {
            return false;
        }
        true
    }

    /// Filter, sort, and window a slice of entries.
    pub fn apply<'a>(&self, entries: &'a [ContentEntry]) -> Vec<&'a ContentEntry> {
        let mut selected: Vec<&ContentEntry> = entries.iter().filter(|e| self.matches(e)).collect();
        if self.sort == SortOrder::DateDescTitleAsc {
            selected.sort_by(|a, b| canonical_order(a, b));
        }
        let limit = self.limit.unwrap_or(usize::MAX);
        selected.into_iter().skip(self.skip).take(limit).collect()
    }
}

/// Canonical entry order: date descending, then title ascending, then id.
///
/// The id tie-break makes the order total, so two entries sharing date and
/// title still sort identically on every run.
pub fn canonical_order(a: &ContentEntry, b: &ContentEntry) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.id.cmp(&b.id))
}

/// A queryable, read-only store of content entries.
pub trait ContentSource {
    /// Run a query. Any error is fatal to the build.
    fn fetch(&self, query: &ContentQuery) -> Result<Snapshot, FetchError>;
}

/// Content entry as stored on disk, before date validation.
///
/// The schema belongs to the content source, so attributes this crate does
/// not use (excerpts, bodies, images) are ignored rather than rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Kept as raw JSON so a null or numeric date is reported per entry.
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub tags: Option<Vec<Option<Tag>>>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub featured: bool,
}

impl RawEntry {
    /// Validate the record. Fails only on a missing or unparseable date.
    pub fn into_entry(self) -> Result<ContentEntry, EntryIssue> {
        let parsed = match &self.date {
            Some(Value::String(raw)) => parse_date(raw),
            _ => None,
        };
        let Some(date) = parsed else {
            let raw = match &self.date {
                Some(Value::String(raw)) => raw.clone(),
                Some(other) => other.to_string(),
                None => "<missing>".to_string(),
            };
            return Err(EntryIssue {
                id: self.id,
                kind: IssueKind::MalformedDate(raw),
            });
        };
        Ok(ContentEntry {
            id: self.id,
            slug: self.slug.filter(|s| !s.trim().is_empty()),
            title: self.title,
            date,
            draft: self.draft,
            private: self.private,
            link: self.link.filter(|l| !l.trim().is_empty()),
            category: self.category,
            tags: self.tags.unwrap_or_default(),
            author: self.author,
            featured: self.featured,
        })
    }
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Split a parsed file into entry records.
fn record_values(path: &Path, value: Value) -> Result<Vec<Value>, FetchError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("entries") {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => {
                map.insert("entries".to_string(), other);
                Ok(vec![Value::Object(map)])
            }
            None => Ok(vec![Value::Object(map)]),
        },
        _ => Err(FetchError::UnexpectedLayout {
            path: path.to_path_buf(),
        }),
    }
}

/// Decode one record. A record without a usable id is reported as
/// `<file>#<index>`.
fn decode_record(path: &Path, index: usize, value: Value) -> Result<ContentEntry, EntryIssue> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}#{index}", path.display()));
    let raw: RawEntry = serde_json::from_value(value).map_err(|e| EntryIssue {
        id,
        kind: IssueKind::MalformedRecord(e.to_string()),
    })?;
    raw.into_entry()
}

/// File-backed content repository.
#[derive(Debug, Clone)]
pub struct JsonContentStore {
    root: PathBuf,
}

impl JsonContentStore {
    /// A snapshot file, or a directory walked recursively for `*.json` files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn source_files(&self) -> Result<Vec<PathBuf>, FetchError> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }
        if !self.root.exists() {
            return Err(FetchError::Io {
                path: self.root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "content not found"),
            });
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            let is_json = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            if entry.file_type().is_file() && is_json && !hidden {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    fn read_records(&self) -> Result<Vec<Result<ContentEntry, EntryIssue>>, FetchError> {
        let mut records = Vec::new();
        for path in self.source_files()? {
            let content = fs::read_to_string(&path).map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;
            let value: Value =
                serde_json::from_str(&content).map_err(|source| FetchError::Json {
                    path: path.clone(),
                    source,
                })?;
            let items = record_values(&path, value)?;
            debug!(path = %path.display(), count = items.len(), "read content file");
            records.extend(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| decode_record(&path, index, item)),
            );
        }
        Ok(records)
    }
}

impl ContentSource for JsonContentStore {
    fn fetch(&self, query: &ContentQuery) -> Result<Snapshot, FetchError> {
        let mut snapshot = Snapshot::default();
        let mut valid = Vec::new();
        for record in self.read_records()? {
            match record {
                Ok(entry) => valid.push(entry),
                Err(issue) => {
                    warn!(%issue, "excluding entry");
                    snapshot.issues.push(issue);
                }
            }
        }
        snapshot.entries = query.apply(&valid).into_iter().cloned().collect();
        Ok(snapshot)
    }
}

/// In-memory repository over already-validated entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub entries: Vec<ContentEntry>,
}

impl MemoryStore {
    pub fn new(entries: Vec<ContentEntry>) -> Self {
        Self { entries }
    }
}

impl ContentSource for MemoryStore {
    fn fetch(&self, query: &ContentQuery) -> Result<Snapshot, FetchError> {
        Ok(Snapshot {
            entries: query.apply(&self.entries).into_iter().cloned().collect(),
            issues: Vec::new(),
        })
    }
}
