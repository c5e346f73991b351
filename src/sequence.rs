//! Canonical ordering and previous/next adjacency.
//!
//! ## Ordering
//!
//! Entries are ordered newest first, ties broken by title and then id (see
//! [`canonical_order`]). The order is total, so it is identical on every run
//! over the same snapshot.
//!
//! ## Adjacency
//!
//! For position `i` in the ordered sequence:
//!
//! ```text
//! previous_id = id[i + 1]   (older neighbour)
//! next_id     = id[i - 1]   (newer neighbour)
//! ```
//!
//! Adjacency is computed over the full sequence, including entries that do
//! not get a page (future-dated, external-link). A page may therefore link
//! to a neighbour id that has no page of its own. Materialization is
//! restricted to eligible entries afterwards; the two steps stay separate.

use crate::content::canonical_order;
use crate::types::ContentEntry;

/// Neighbours of one entry in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency<'a> {
    pub previous_id: Option<&'a str>,
    pub next_id: Option<&'a str>,
}

/// Sort entries into canonical order.
pub fn sequence(entries: &[ContentEntry]) -> Vec<&ContentEntry> {
    let mut ordered: Vec<&ContentEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| canonical_order(a, b));
    ordered
}

/// Compute neighbours for every position of an already ordered sequence.
///
/// The result is parallel to `ordered`: `adjacency(ordered)[i]` belongs to
/// `ordered[i]`.
pub fn adjacency<'a>(ordered: &[&'a ContentEntry]) -> Vec<Adjacency<'a>> {
    (0..ordered.len())
        .map(|i| Adjacency {
            previous_id: ordered.get(i + 1).map(|e| e.id.as_str()),
            next_id: i
                .checked_sub(1)
                .and_then(|j| ordered.get(j))
                .map(|e| e.id.as_str()),
        })
        .collect()
}
