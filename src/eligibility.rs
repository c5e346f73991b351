//! Per-entry visibility for the current build.
//!
//! Two predicates, both pure functions of an entry and the build timestamp:
//!
//! - [`is_eligible`] decides whether an entry gets its own page.
//! - [`is_listed`] decides whether an entry may appear on listing and
//!   collection pages. Listed entries are always a subset of eligible ones.
//!
//! Eligibility does not affect ordering: adjacency is computed over the full
//! sequence (see [`crate::sequence`]).

use crate::types::{BuildTimestamp, ContentEntry};

/// Whether the entry gets its own page in this build.
///
/// False for drafts, entries dated after `now`, and entries that point to an
/// external link.
pub fn is_eligible(entry: &ContentEntry, now: BuildTimestamp) -> bool {
    !entry.draft && entry.date <= now.instant() && entry.link.is_none()
}

/// Whether the entry may appear on listing and collection pages.
///
/// Private entries keep their own page (reachable by direct URL) but are
/// never listed.
pub fn is_listed(entry: &ContentEntry, now: BuildTimestamp) -> bool {
    is_eligible(entry, now) && !entry.private
}
