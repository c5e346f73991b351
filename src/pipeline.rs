//! Build orchestration: from content snapshot to materialized pages.
//!
//! ## Flow
//!
//! ```text
//! ContentSource::fetch ──► Snapshot
//!                             │
//!                 ┌───────────┼──────────────┬───────────────┐
//!                 ▼           ▼              ▼               ▼
//!           entry_pages   posts_pages   category_pages   author_pages
//!                 │           └──── rayon::join ─────────────┘
//!                 ▼
//!             PagePlan ──► check_unique_paths ──► Materializer ──► PageSink
//! ```
//!
//! ## States
//!
//! A [`Build`] moves through `Idle → Fetching → Materializing → Done`. A fetch
//! failure, a path collision, or a sink error ends in `Failed`; nothing is
//! created when the planned page set contains a collision, so there is no
//! partial-success state.
//!
//! ## Pipelines
//!
//! - **Entries**: one page per eligible entry at its slug, with adjacency
//!   taken from the full canonical sequence.
//! - **Posts**: the home listing, either paginated or a single composite page
//!   (featured, recent, category groups).
//! - **Categories / Authors**: one paginated collection per category or
//!   author that has listed entries.
//!
//! The listing pipelines only read the immutable snapshot and emit disjoint
//! paths, so they run concurrently. Each re-derives its own subset with a
//! [`ContentQuery`] and [`is_listed`].

use crate::config::{CollectionConfig, EntriesConfig, PostsConfig, SiteConfig};
use crate::content::{ContentQuery, ContentSource, EntryIssue, FetchError, IssueKind, Snapshot};
use crate::eligibility::{is_eligible, is_listed};
use crate::group::{compose, group_by_category};
use crate::materialize::{MaterializeError, Materializer, PageSink, check_unique_paths};
use crate::paginate::{PaginationWindow, paginate};
use crate::paths::{checked_path, join_path, normalize_path};
use crate::sequence::{adjacency, sequence};
use crate::types::{
    BuildTimestamp, CollectionInfo, CollectionKind, CompositeContext, ContentEntry, EntryContext,
    ListingContext, PageContext, PageSpec,
};
use crate::xref::resolve_keys;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Content fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Materialization failed: {0}")]
    Materialize(#[from] MaterializeError),
    #[error("Build already ran (state: {0:?})")]
    AlreadyRun(BuildState),
}

/// Lifecycle of a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    Fetching,
    Materializing,
    Done,
    Failed,
}

/// Which pipeline produced a group of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineKind {
    Entries,
    Posts,
    Categories,
    Authors,
}

impl PipelineKind {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineKind::Entries => "Entries",
            PipelineKind::Posts => "Posts",
            PipelineKind::Categories => "Categories",
            PipelineKind::Authors => "Authors",
        }
    }
}

/// Pages emitted by one pipeline, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub kind: PipelineKind,
    pub pages: Vec<PageSpec>,
}

/// Every page of a build, before materialization.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub build_timestamp: BuildTimestamp,
    pub outputs: Vec<PipelineOutput>,
    /// Entries excluded by data-quality problems.
    pub issues: Vec<EntryIssue>,
}

impl PagePlan {
    pub fn pages(&self) -> impl Iterator<Item = &PageSpec> {
        self.outputs.iter().flat_map(|o| o.pages.iter())
    }

    pub fn len(&self) -> usize {
        self.outputs.iter().map(|o| o.pages.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn output(&self, kind: PipelineKind) -> Option<&PipelineOutput> {
        self.outputs.iter().find(|o| o.kind == kind)
    }

    /// SHA-256 over the serialized page set. Identical snapshots and build
    /// timestamps always produce identical digests.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let mut hasher = Sha256::new();
        for page in self.pages() {
            hasher.update(serde_json::to_vec(page)?);
            hasher.update(b"\n");
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Outcome of a successful build.
#[derive(Debug)]
pub struct BuildSummary {
    pub plan: PagePlan,
    pub created: usize,
}

// ============================================================================
// Entry pipeline
// ============================================================================

/// One page per eligible entry.
///
/// Adjacency is computed over every entry of the snapshot; only eligible
/// entries are materialized. The page path is the normalized slug, so `post`
/// and `/post/` both land at `/post`. An eligible entry without a slug, or
/// with `.`/`..` segments in it, is reported and skipped without affecting
/// its neighbours.
pub fn entry_pages(
    entries: &[ContentEntry],
    now: BuildTimestamp,
    config: &EntriesConfig,
) -> (Vec<PageSpec>, Vec<EntryIssue>) {
    let ordered = sequence(entries);
    let neighbours = adjacency(&ordered);

    let mut pages = Vec::new();
    let mut issues = Vec::new();
    for (entry, adj) in ordered.iter().zip(neighbours) {
        if !is_eligible(entry, now) {
            continue;
        }
        let Some(slug) = entry.slug.as_deref() else {
            warn!(id = %entry.id, "eligible entry has no slug");
            issues.push(EntryIssue {
                id: entry.id.clone(),
                kind: IssueKind::MissingSlug,
            });
            continue;
        };
        let Some(path) = checked_path(slug) else {
            warn!(id = %entry.id, slug = %slug, "entry slug leaves the site root");
            issues.push(EntryIssue {
                id: entry.id.clone(),
                kind: IssueKind::InvalidSlug(slug.to_string()),
            });
            continue;
        };
        let keys = resolve_keys(entry);
        pages.push(PageSpec {
            path,
            template: config.template.clone(),
            context: PageContext::Entry(EntryContext {
                id: entry.id.clone(),
                category_id: keys.category_id,
                tag_ids: keys.tag_ids,
                has_tags: keys.has_tags,
                previous_id: adj.previous_id.map(str::to_string),
                next_id: adj.next_id.map(str::to_string),
                build_timestamp: now,
            }),
        });
    }
    (pages, issues)
}

// ============================================================================
// Listing pipelines
// ============================================================================

/// Entries a listing may show, in canonical order.
fn listed<'a>(
    entries: &'a [ContentEntry],
    now: BuildTimestamp,
    query: &ContentQuery,
) -> Vec<&'a ContentEntry> {
    query
        .apply(entries)
        .into_iter()
        .filter(|e| is_listed(e, now))
        .collect()
}

fn ids(entries: &[&ContentEntry]) -> Vec<String> {
    entries.iter().map(|e| e.id.clone()).collect()
}

fn listing_page(
    template: &crate::types::TemplateId,
    window: &PaginationWindow,
    items: &[&ContentEntry],
    collection: Option<CollectionInfo>,
    now: BuildTimestamp,
) -> PageSpec {
    PageSpec {
        path: window.path(),
        template: template.clone(),
        context: PageContext::Listing(ListingContext {
            collection,
            entry_ids: ids(items),
            pagination: window.to_context(),
            build_timestamp: now,
        }),
    }
}

/// The home/posts listing.
///
/// Paginated mode emits one page per window and always emits the first
/// window, even when nothing is listed. Composite mode emits a single page.
pub fn posts_pages(
    entries: &[ContentEntry],
    now: BuildTimestamp,
    config: &PostsConfig,
    site: &SiteConfig,
) -> Vec<PageSpec> {
    let listed = listed(entries, now, &ContentQuery::published(now));

    if config.paginate {
        let pages: Vec<PageSpec> = paginate(&listed, config.items_per_page, &config.base_path)
            .iter()
            .map(|page| listing_page(&config.template, &page.window, page.items, None, now))
            .collect();
        if !pages.is_empty() {
            return pages;
        }
        let empty = PaginationWindow {
            page_index: 0,
            items_per_page: config.items_per_page.get(),
            total_items: 0,
            base_path: normalize_path(&config.base_path),
        };
        return vec![listing_page(&config.template, &empty, &[], None, now)];
    }

    let featured: Vec<&ContentEntry> = listed
        .iter()
        .copied()
        .filter(|e| e.featured)
        .take(config.featured_limit)
        .collect();
    let recent: Vec<&ContentEntry> = listed.iter().copied().take(config.recent_limit).collect();
    let groups = group_by_category(&listed, site.groups.limits());

    vec![PageSpec {
        path: normalize_path(&config.base_path),
        template: config.template.clone(),
        context: PageContext::Composite(CompositeContext {
            featured_ids: ids(&featured),
            recent_ids: ids(&recent),
            sections: compose(&groups),
            build_timestamp: now,
        }),
    }]
}

/// Paginated collections keyed by slug; only collections with listed
/// entries get pages.
fn collection_pages<F>(
    entries: &[ContentEntry],
    now: BuildTimestamp,
    config: &CollectionConfig,
    collections: BTreeMap<String, CollectionInfo>,
    query_for: F,
) -> Vec<PageSpec>
where
    F: Fn(&str) -> ContentQuery,
{
    let mut pages = Vec::new();
    for (slug, info) in collections {
        let Some(segment) = checked_path(&slug) else {
            warn!(slug = %slug, kind = ?info.kind, "collection slug leaves the site root, skipped");
            continue;
        };
        let members = listed(entries, now, &query_for(&slug));
        let base_path = join_path(&config.base_path, &segment);
        for page in paginate(&members, config.items_per_page, &base_path) {
            pages.push(listing_page(
                &config.template,
                &page.window,
                page.items,
                Some(info.clone()),
                now,
            ));
        }
    }
    pages
}

/// One paginated collection per category, ordered by category slug.
pub fn category_pages(
    entries: &[ContentEntry],
    now: BuildTimestamp,
    config: &CollectionConfig,
) -> Vec<PageSpec> {
    let mut collections = BTreeMap::new();
    for entry in listed(entries, now, &ContentQuery::published(now)) {
        if let Some(category) = &entry.category {
            collections
                .entry(category.slug.clone())
                .or_insert_with(|| CollectionInfo {
                    kind: CollectionKind::Category,
                    id: category.id.clone(),
                    name: category.name.clone(),
                    slug: category.slug.clone(),
                });
        }
    }
    collection_pages(entries, now, config, collections, |slug| {
        ContentQuery::published(now).in_category(slug)
    })
}

/// One paginated collection per author, ordered by author slug.
pub fn author_pages(
    entries: &[ContentEntry],
    now: BuildTimestamp,
    config: &CollectionConfig,
) -> Vec<PageSpec> {
    let mut collections = BTreeMap::new();
    for entry in listed(entries, now, &ContentQuery::published(now)) {
        if let Some(author) = &entry.author {
            collections
                .entry(author.slug.clone())
                .or_insert_with(|| CollectionInfo {
                    kind: CollectionKind::Author,
                    id: author.id.clone(),
                    name: author.name.clone(),
                    slug: author.slug.clone(),
                });
        }
    }
    collection_pages(entries, now, config, collections, |slug| {
        ContentQuery::published(now).by_author(slug)
    })
}

// ============================================================================
// Planning and the build state machine
// ============================================================================

/// Run every pipeline over a snapshot. Pure and deterministic.
pub fn plan(snapshot: &Snapshot, now: BuildTimestamp, config: &SiteConfig) -> PagePlan {
    let entries = &snapshot.entries;
    let (entry_specs, mut issues) = entry_pages(entries, now, &config.entries);

    let (posts, (categories, authors)) = rayon::join(
        || posts_pages(entries, now, &config.posts, config),
        || {
            rayon::join(
                || category_pages(entries, now, &config.category),
                || author_pages(entries, now, &config.author),
            )
        },
    );

    let mut all_issues = snapshot.issues.clone();
    all_issues.append(&mut issues);

    PagePlan {
        build_timestamp: now,
        outputs: vec![
            PipelineOutput {
                kind: PipelineKind::Entries,
                pages: entry_specs,
            },
            PipelineOutput {
                kind: PipelineKind::Posts,
                pages: posts,
            },
            PipelineOutput {
                kind: PipelineKind::Categories,
                pages: categories,
            },
            PipelineOutput {
                kind: PipelineKind::Authors,
                pages: authors,
            },
        ],
        issues: all_issues,
    }
}

/// Verify and hand every planned page to the sink.
pub fn materialize_plan(plan: &PagePlan, sink: &mut dyn PageSink) -> Result<usize, MaterializeError> {
    let pages: Vec<PageSpec> = plan.pages().cloned().collect();
    check_unique_paths(&pages)?;
    let mut materializer = Materializer::new(sink);
    for page in &pages {
        materializer.materialize(page)?;
    }
    materializer.finish()
}

/// One full, one-shot build against a content source.
pub struct Build<'a> {
    source: &'a dyn ContentSource,
    config: &'a SiteConfig,
    now: BuildTimestamp,
    state: BuildState,
}

impl<'a> Build<'a> {
    pub fn new(source: &'a dyn ContentSource, config: &'a SiteConfig, now: BuildTimestamp) -> Self {
        Self {
            source,
            config,
            now,
            state: BuildState::Idle,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Fetch, plan, and materialize. A build runs at most once.
    pub fn run(&mut self, sink: &mut dyn PageSink) -> Result<BuildSummary, BuildError> {
        if self.state != BuildState::Idle {
            return Err(BuildError::AlreadyRun(self.state));
        }

        self.state = BuildState::Fetching;
        info!(build_timestamp = %self.now, "fetching content");
        let snapshot = match self.source.fetch(&ContentQuery::all()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.state = BuildState::Failed;
                return Err(e.into());
            }
        };

        self.state = BuildState::Materializing;
        info!(entries = snapshot.entries.len(), "planning pages");
        let plan = plan(&snapshot, self.now, self.config);
        for issue in &plan.issues {
            warn!(%issue, "entry skipped");
        }

        match materialize_plan(&plan, sink) {
            Ok(created) => {
                self.state = BuildState::Done;
                info!(pages = created, "build complete");
                Ok(BuildSummary { plan, created })
            }
            Err(e) => {
                self.state = BuildState::Failed;
                Err(e.into())
            }
        }
    }
}
