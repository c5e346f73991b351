//! Page materialization: handing resolved pages to the host build system.
//!
//! [`PageSink`] is the host's page-creation operation and the only way pages
//! enter the output set. [`Materializer`] sits in front of a sink and makes
//! path uniqueness a hard error instead of a silent overwrite.
//!
//! ## Sinks
//!
//! - [`MemorySink`]: collects pages in memory (tests, dry runs).
//! - [`JsonDirSink`]: writes one `page.json` per page plus a `pages.json`
//!   index, the hand-off format for an external renderer:
//!
//! ```text
//! dist/
//! ├── pages.json                  # [{ path, template, context }, ...]
//! ├── page.json                   # "/"
//! ├── hello-world/page.json       # "/hello-world"
//! └── category/
//!     └── travel/
//!         ├── page.json           # "/category/travel"
//!         └── page/2/page.json    # "/category/travel/page/2"
//! ```
//!
//! Every build is a full rebuild. Before writing, [`JsonDirSink`] removes
//! the pages listed in the previous build's `pages.json`, so a page dropped
//! from the content does not linger. Files it did not write are left alone.

use crate::paths::is_plain_segment;
use crate::types::PageSpec;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const INDEX_FILE: &str = "pages.json";

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Duplicate page path {path} (template {template})")]
    PathCollision { path: String, template: String },
    #[error("Page path {path} does not map to a file under the output directory")]
    UnsafePath { path: String },
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The host build system's page-creation operation.
pub trait PageSink {
    fn create_page(&mut self, spec: &PageSpec) -> Result<(), MaterializeError>;

    /// Called once after the last page of a successful build.
    fn finish(&mut self) -> Result<(), MaterializeError> {
        Ok(())
    }
}

/// Verify a planned page set before anything is created.
pub fn check_unique_paths(specs: &[PageSpec]) -> Result<(), MaterializeError> {
    let mut seen = HashSet::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.path.as_str()) {
            return Err(collision(spec));
        }
    }
    Ok(())
}

fn collision(spec: &PageSpec) -> MaterializeError {
    MaterializeError::PathCollision {
        path: spec.path.clone(),
        template: spec.template.to_string(),
    }
}

/// Forwards each page to a sink exactly once per unique path.
pub struct Materializer<'s> {
    sink: &'s mut dyn PageSink,
    seen: HashSet<String>,
}

impl<'s> Materializer<'s> {
    pub fn new(sink: &'s mut dyn PageSink) -> Self {
        Self {
            sink,
            seen: HashSet::new(),
        }
    }

    /// Create one page. A path already created in this build is an error.
    pub fn materialize(&mut self, spec: &PageSpec) -> Result<(), MaterializeError> {
        if !self.seen.insert(spec.path.clone()) {
            return Err(collision(spec));
        }
        debug!(path = %spec.path, template = %spec.template, "creating page");
        self.sink.create_page(spec)
    }

    /// Number of pages created so far.
    pub fn created(&self) -> usize {
        self.seen.len()
    }

    pub fn finish(self) -> Result<usize, MaterializeError> {
        self.sink.finish()?;
        Ok(self.seen.len())
    }
}

/// Collects created pages in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub pages: Vec<PageSpec>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageSink for MemorySink {
    fn create_page(&mut self, spec: &PageSpec) -> Result<(), MaterializeError> {
        self.pages.push(spec.clone());
        Ok(())
    }
}

/// Writes every page as `<output>/<path>/page.json` plus a `pages.json` index.
#[derive(Debug)]
pub struct JsonDirSink {
    output_dir: PathBuf,
    index: Vec<PageSpec>,
    cleared: bool,
}

/// The part of a previous index entry needed to find its file.
#[derive(Deserialize)]
struct IndexedPage {
    path: String,
}

impl JsonDirSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            index: Vec::new(),
            cleared: false,
        }
    }

    /// File a page path is written to. Refuses `.`/`..` segments.
    pub fn page_file(&self, path: &str) -> Result<PathBuf, MaterializeError> {
        let mut file = self.output_dir.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !is_plain_segment(segment) {
                return Err(MaterializeError::UnsafePath {
                    path: path.to_string(),
                });
            }
            file.push(segment);
        }
        Ok(file.join("page.json"))
    }

    /// Remove the pages listed in a previous build's index, then the index.
    fn clear_previous(&mut self) -> Result<(), MaterializeError> {
        if self.cleared {
            return Ok(());
        }
        self.cleared = true;

        let index = self.output_dir.join(INDEX_FILE);
        let content = match fs::read_to_string(&index) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(MaterializeError::Io { path: index, source }),
        };
        let previous: Vec<IndexedPage> = match serde_json::from_str(&content) {
            Ok(previous) => previous,
            Err(e) => {
                warn!(path = %index.display(), error = %e, "unreadable page index, previous pages kept");
                return Ok(());
            }
        };

        for page in &previous {
            let Ok(file) = self.page_file(&page.path) else {
                continue;
            };
            remove_if_present(&file)?;
            self.prune_empty_dirs(&file);
        }
        debug!(pages = previous.len(), "cleared previous build");
        remove_if_present(&index)
    }

    /// Remove now-empty directories between a removed file and the output root.
    fn prune_empty_dirs(&self, file: &Path) {
        let mut dir = file.parent();
        while let Some(d) = dir {
            if d == self.output_dir || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }

    fn write(path: &Path, contents: &str) -> Result<(), MaterializeError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| MaterializeError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, contents).map_err(|source| MaterializeError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn remove_if_present(path: &Path) -> Result<(), MaterializeError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(MaterializeError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
        _ => Ok(()),
    }
}

impl PageSink for JsonDirSink {
    fn create_page(&mut self, spec: &PageSpec) -> Result<(), MaterializeError> {
        let file = self.page_file(&spec.path)?;
        self.clear_previous()?;
        Self::write(&file, &serde_json::to_string_pretty(spec)?)?;
        self.index.push(spec.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MaterializeError> {
        self.clear_previous()?;
        let index = self.output_dir.join(INDEX_FILE);
        Self::write(&index, &serde_json::to_string_pretty(&self.index)?)
    }
}
