//! Shared types used across all pipeline stages.
//!
//! Content types ([`ContentEntry`], [`Category`], [`Tag`], [`Author`]) are
//! read-only inputs owned by the content repository. Page types
//! ([`PageSpec`], [`PageContext`]) are the output handed to the host build
//! system. Both sides serialize to JSON, and the camelCase context keys are
//! the contract the rendering layer reads.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The single instant a build is evaluated against.
///
/// Captured once at pipeline entry and passed by value to every stage, so
/// every "is this entry in the future?" decision uses the same cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildTimestamp(DateTime<Utc>);

impl BuildTimestamp {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Read the clock. Only the CLI entry point should call this.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for BuildTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// One publishable unit, immutable for the duration of a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentEntry {
    pub id: String,
    /// Path segment of the entry's own page. May be absent in the store.
    pub slug: Option<String>,
    /// Secondary sort key after `date`.
    pub title: String,
    pub date: DateTime<Utc>,
    pub draft: bool,
    pub private: bool,
    /// Present when the entry resolves to an outside destination; such
    /// entries never get their own page.
    pub link: Option<String>,
    pub category: Option<Category>,
    /// Tag references as delivered by the store; `None` members are
    /// dangling references and are dropped by the cross-reference resolver.
    pub tags: Vec<Option<Tag>>,
    pub author: Option<Author>,
    pub featured: bool,
}

/// Opaque handle to a rendering template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully resolved description of one page to create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSpec {
    pub path: String,
    pub template: TemplateId,
    pub context: PageContext,
}

/// Values passed to the template. Closed set of shapes; optional fields
/// are omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageContext {
    Entry(EntryContext),
    Listing(ListingContext),
    Composite(CompositeContext),
}

impl PageContext {
    pub fn build_timestamp(&self) -> BuildTimestamp {
        match self {
            PageContext::Entry(c) => c.build_timestamp,
            PageContext::Listing(c) => c.build_timestamp,
            PageContext::Composite(c) => c.build_timestamp,
        }
    }
}

/// Context of an individual entry page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryContext {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub tag_ids: Vec<String>,
    pub has_tags: bool,
    /// Older neighbour in canonical order. May reference an entry without a page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
    /// Newer neighbour in canonical order. May reference an entry without a page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    pub build_timestamp: BuildTimestamp,
}

/// Which collection a listing page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Category,
    Author,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub kind: CollectionKind,
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Navigation data for one pagination window, precomputed so the renderer
/// never re-derives previous/next page links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationContext {
    pub page_index: usize,
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub skip: usize,
    pub limit: usize,
    pub base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_path: Option<String>,
}

/// Context of a paginated listing page (posts, category, author).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionInfo>,
    pub entry_ids: Vec<String>,
    pub pagination: PaginationContext,
    pub build_timestamp: BuildTimestamp,
}

/// Presentation variant of a category group on the composite listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutVariant {
    A,
    B,
}

/// One block of the composite listing, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Section {
    #[serde(rename_all = "camelCase")]
    Group {
        category_id: String,
        category_name: String,
        category_slug: String,
        variant: LayoutVariant,
        entry_ids: Vec<String>,
    },
    /// External promotional widget slot.
    Promotional,
}

/// Context of the grouped home listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeContext {
    pub featured_ids: Vec<String>,
    pub recent_ids: Vec<String>,
    pub sections: Vec<Section>,
    pub build_timestamp: BuildTimestamp,
}
