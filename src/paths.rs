//! Centralized page path construction.
//!
//! Every page the pipeline emits gets its path from this module, so entry
//! slugs, listing base paths, and pagination suffixes are normalized the same
//! way and two spellings of one URL can never slip past the collision check.
//!
//! ## Normal Form
//!
//! - Exactly one leading slash: `"blog/post"` → `"/blog/post"`
//! - No trailing slash except for the root: `"/blog/"` → `"/blog"`
//! - Repeated slashes collapsed: `"//a///b"` → `"/a/b"`
//! - Empty input is the root: `""` → `"/"`
//!
//! [`normalize_path`] does not interpret `.` or `..`. Paths built from
//! content data (entry slugs, category and author slugs) go through
//! [`checked_path`], which refuses them, so no page can resolve outside the
//! output root and `/a/../b` can never stand in for `/b`.

/// Normalize a path to the canonical form described above.
pub fn normalize_path(raw: &str) -> String {
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// A segment that maps to exactly one directory name.
pub fn is_plain_segment(segment: &str) -> bool {
    segment != "." && segment != ".." && !segment.contains('\\')
}

/// Normalize untrusted input, refusing `.`/`..` segments and backslashes.
///
/// - `checked_path("post")` → `Some("/post")`
/// - `checked_path("/../escaped")` → `None`
pub fn checked_path(raw: &str) -> Option<String> {
    if raw.split('/').all(is_plain_segment) {
        Some(normalize_path(raw))
    } else {
        None
    }
}

/// Join a base path and a segment, normalizing the result.
///
/// - `join_path("/", "post")` → `"/post"`
/// - `join_path("/category", "travel")` → `"/category/travel"`
pub fn join_path(base: &str, segment: &str) -> String {
    normalize_path(&format!("{base}/{segment}"))
}

/// Path of a pagination window under `base_path`.
///
/// Window 0 lives at the base path itself; later windows use 1-based page
/// numbers under a `page/` segment:
///
/// - `window_path("/", 0)` → `"/"`
/// - `window_path("/", 1)` → `"/page/2"`
/// - `window_path("/author/ann", 2)` → `"/author/ann/page/3"`
pub fn window_path(base_path: &str, page_index: usize) -> String {
    if page_index == 0 {
        normalize_path(base_path)
    } else {
        join_path(base_path, &format!("page/{}", page_index + 1))
    }
}
