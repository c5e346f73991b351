//! # Folio Pages
//!
//! The page materialization step of a static site generator for an article
//! site. Given a snapshot of content entries, it decides which URLs exist and
//! what each page receives as its context, then hands every page to the host
//! build system. Rendering HTML is someone else's job.
//!
//! # Architecture: Snapshot to Pages
//!
//! ```text
//! 1. Fetch        content source  →  Snapshot      (one query, read once)
//! 2. Plan         Snapshot        →  PagePlan      (pure, deterministic)
//! 3. Materialize  PagePlan        →  PageSink      (unique paths or nothing)
//! ```
//!
//! Planning is a pure function of the snapshot, the config, and a single
//! build timestamp captured at startup. Two builds over the same inputs
//! produce byte-identical page sets; [`pipeline::PagePlan::digest`] makes
//! that checkable.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Content repository: entry records, queries, JSON and in-memory stores |
//! | [`eligibility`] | Whether an entry gets a page (`is_eligible`) or appears in listings (`is_listed`) |
//! | [`sequence`] | Canonical ordering and previous/next adjacency |
//! | [`xref`] | Category and tag keys handed to entry templates |
//! | [`paginate`] | Fixed-size windows and their URL paths |
//! | [`group`] | Category groups and the A/B section layout of the composite home page |
//! | [`materialize`] | The page sink seam, collision checking, file and memory sinks |
//! | [`pipeline`] | Entry, posts, category, and author pipelines plus the build state machine |
//! | [`config`] | `config.toml` loading, merging over stock defaults, and validation |
//! | [`paths`] | URL path normalization and joining |
//! | [`types`] | Shared page and context types serialized to templates |
//! | [`output`] | CLI output formatting of planned and built pages |
//!
//! # Design Decisions
//!
//! ## Adjacency Before Eligibility
//!
//! Previous/next neighbours are computed over the whole canonical sequence
//! and only then are ineligible entries dropped. A page can name a neighbour
//! that has no page of its own (a scheduled post, an external link). Templates
//! decide what to do with such ids.
//!
//! ## Collisions Are Fatal
//!
//! Two pages resolving to the same path fail the build before the first page
//! is created. A silent overwrite would make the output depend on emission
//! order.
//!
//! ## One Timestamp Per Build
//!
//! [`types::BuildTimestamp`] is captured once and threaded through every
//! pipeline. Eligibility and every page context see the same instant.

pub mod config;
pub mod content;
pub mod eligibility;
pub mod group;
pub mod materialize;
pub mod output;
pub mod paginate;
pub mod paths;
pub mod pipeline;
pub mod sequence;
pub mod types;
pub mod xref;

#[cfg(test)]
pub(crate) mod test_helpers;
