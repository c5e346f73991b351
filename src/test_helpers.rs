//! Shared test utilities for the folio-pages test suite.
//!
//! Provides a terse entry builder, timestamp parsing, and canned content sets.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let e = entry("a1", "2024-05-01")
//!     .category("travel")
//!     .author("ann")
//!     .tags(&["t1"])
//!     .build();
//! assert_eq!(e.slug.as_deref(), Some("/a1"));
//! ```

use crate::content::parse_date;
use crate::types::{
    Author, BuildTimestamp, Category, ContentEntry, ListingContext, PageContext, PageSpec,
    PaginationContext, Tag, TemplateId,
};

// =========================================================================
// Timestamps
// =========================================================================

/// Parse an RFC 3339 timestamp or bare date. Panics on bad input.
pub fn ts(raw: &str) -> BuildTimestamp {
    BuildTimestamp::new(parse_date(raw).unwrap_or_else(|| panic!("bad test timestamp {raw:?}")))
}

// =========================================================================
// Entry builder
// =========================================================================

pub struct EntryBuilder {
    entry: ContentEntry,
}

/// Published, public entry with slug `/<id>` and title `Title <id>`.
pub fn entry(id: &str, date: &str) -> EntryBuilder {
    EntryBuilder {
        entry: ContentEntry {
            id: id.to_string(),
            slug: Some(format!("/{id}")),
            title: format!("Title {id}"),
            date: ts(date).instant(),
            draft: false,
            private: false,
            link: None,
            category: None,
            tags: Vec::new(),
            author: None,
            featured: false,
        },
    }
}

impl EntryBuilder {
    pub fn title(mut self, title: &str) -> Self {
        self.entry.title = title.to_string();
        self
    }

    pub fn slug(mut self, slug: &str) -> Self {
        self.entry.slug = Some(slug.to_string());
        self
    }

    pub fn draft(mut self) -> Self {
        self.entry.draft = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.entry.private = true;
        self
    }

    pub fn featured(mut self) -> Self {
        self.entry.featured = true;
        self
    }

    pub fn link(mut self, url: &str) -> Self {
        self.entry.link = Some(url.to_string());
        self
    }

    /// Category with id `cat-<slug>` and name equal to the slug.
    pub fn category(mut self, slug: &str) -> Self {
        self.entry.category = Some(Category {
            id: format!("cat-{slug}"),
            name: slug.to_string(),
            slug: slug.to_string(),
        });
        self
    }

    /// Author with id `author-<slug>` and name equal to the slug.
    pub fn author(mut self, slug: &str) -> Self {
        self.entry.author = Some(Author {
            id: format!("author-{slug}"),
            name: slug.to_string(),
            slug: slug.to_string(),
        });
        self
    }

    pub fn tags(mut self, ids: &[&str]) -> Self {
        self.entry.tags = ids
            .iter()
            .map(|id| Some(Tag { id: id.to_string() }))
            .collect();
        self
    }

    pub fn build(self) -> ContentEntry {
        self.entry
    }
}

// =========================================================================
// Canned content
// =========================================================================

/// `count` published entries `n0, n1, ...`, one hour apart, newest last.
pub fn numbered_entries(count: usize, day: &str) -> Vec<ContentEntry> {
    let base = ts(day).instant();
    (0..count)
        .map(|n| {
            let mut e = entry(&format!("n{n}"), day).build();
            e.date = base + chrono::Duration::hours(n as i64);
            e
        })
        .collect()
}

/// Ten entries: three future-dated, one external link, six eligible.
///
/// Evaluate against `2024-06-01T00:00:00Z`.
pub fn scenario_entries() -> Vec<ContentEntry> {
    vec![
        entry("p1", "2024-05-10").category("travel").author("ann").build(),
        entry("p2", "2024-05-09").category("food").author("bob").build(),
        entry("p3", "2024-05-08").category("travel").author("ann").tags(&["t1"]).build(),
        entry("p4", "2024-05-07").category("food").author("ann").build(),
        entry("p5", "2024-05-06").author("bob").build(),
        entry("p6", "2024-05-05").category("travel").build(),
        entry("ext", "2024-05-04")
            .category("travel")
            .author("ann")
            .link("https://elsewhere.test/post")
            .build(),
        entry("f1", "2024-06-10").category("travel").author("ann").build(),
        entry("f2", "2024-07-01").category("food").author("bob").build(),
        entry("f3", "2025-01-01").author("ann").build(),
    ]
}

// =========================================================================
// Page specs
// =========================================================================

/// Minimal listing page at `path`.
pub fn listing_spec(path: &str) -> PageSpec {
    PageSpec {
        path: path.to_string(),
        template: TemplateId::new("posts"),
        context: PageContext::Listing(ListingContext {
            collection: None,
            entry_ids: Vec::new(),
            pagination: PaginationContext {
                page_index: 0,
                current_page: 1,
                items_per_page: 6,
                total_items: 0,
                total_pages: 0,
                skip: 0,
                limit: 6,
                base_path: path.to_string(),
                previous_path: None,
                next_path: None,
            },
            build_timestamp: ts("2024-06-01T00:00:00Z"),
        }),
    }
}

/// Find a page by path. Panics if not found.
pub fn find_page<'a>(pages: &'a [PageSpec], path: &str) -> &'a PageSpec {
    pages.iter().find(|p| p.path == path).unwrap_or_else(|| {
        let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
        panic!("page '{path}' not found. Available: {paths:?}")
    })
}
