//! CLI output formatting for build results.
//!
//! # Information-First Display
//!
//! Every page leads with its positional index and path, with the template
//! and the most useful context (neighbours, window position, group count) as
//! indented detail lines. The output reads as an inventory of the site.
//!
//! # Output Format
//!
//! ```text
//! Entries (6 pages)
//! 001 /hello-world → article
//!     Previous: a2
//!     Tags: t1, t2
//! 002 /second-post → article
//!     Previous: a3  Next: a1
//!
//! Posts (1 page)
//! 001 / → posts
//!     Composite: 3 featured, 6 recent, 4 groups
//!
//! Categories (3 pages)
//! 001 /category/travel → collection.category
//!     travel, page 1 of 2, 6 entries
//!
//! Issues
//!     draft-17: malformed date "someday", entry excluded
//!
//! Generated 10 pages at 2024-06-01T00:00:00Z
//! Digest: 3f0c…
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` and are pure; `print_*`
//! wrappers write to stdout.

use crate::pipeline::{BuildSummary, PagePlan};
use crate::types::{PageContext, PageSpec, Section};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Header line plus detail lines for one page.
fn page_lines(index: usize, page: &PageSpec) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} → {}",
        format_index(index),
        page.path,
        page.template
    )];
    let detail = indent(1);
    match &page.context {
        PageContext::Entry(ctx) => {
            let mut neighbours = Vec::new();
            if let Some(prev) = &ctx.previous_id {
                neighbours.push(format!("Previous: {prev}"));
            }
            if let Some(next) = &ctx.next_id {
                neighbours.push(format!("Next: {next}"));
            }
            if !neighbours.is_empty() {
                lines.push(format!("{detail}{}", neighbours.join("  ")));
            }
            if ctx.has_tags {
                lines.push(format!("{detail}Tags: {}", ctx.tag_ids.join(", ")));
            }
        }
        PageContext::Listing(ctx) => {
            let p = &ctx.pagination;
            let position = format!(
                "page {} of {}, {}",
                p.current_page,
                p.total_pages.max(1),
                plural(ctx.entry_ids.len(), "entry", "entries")
            );
            match &ctx.collection {
                Some(info) => lines.push(format!("{detail}{}, {position}", info.name)),
                None => lines.push(format!("{detail}{position}")),
            }
        }
        PageContext::Composite(ctx) => {
            let groups = ctx
                .sections
                .iter()
                .filter(|s| matches!(s, Section::Group { .. }))
                .count();
            lines.push(format!(
                "{detail}Composite: {} featured, {} recent, {}",
                ctx.featured_ids.len(),
                ctx.recent_ids.len(),
                plural(groups, "group", "groups")
            ));
        }
    }
    lines
}

/// Format the planned pages grouped by pipeline, plus any entry issues.
pub fn format_plan(plan: &PagePlan) -> Vec<String> {
    let mut lines = Vec::new();
    for output in &plan.outputs {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!(
            "{} ({})",
            output.kind.label(),
            plural(output.pages.len(), "page", "pages")
        ));
        for (i, page) in output.pages.iter().enumerate() {
            lines.extend(page_lines(i + 1, page));
        }
    }
    if !plan.issues.is_empty() {
        lines.push(String::new());
        lines.push("Issues".to_string());
        for issue in &plan.issues {
            lines.push(format!("{}{issue}", indent(1)));
        }
    }
    lines
}

/// Format the result of a completed build.
pub fn format_build_output(summary: &BuildSummary) -> Vec<String> {
    let mut lines = format_plan(&summary.plan);
    lines.push(String::new());
    lines.push(format!(
        "Generated {} at {}",
        plural(summary.created, "page", "pages"),
        summary.plan.build_timestamp
    ));
    match summary.plan.digest() {
        Ok(digest) => lines.push(format!("Digest: {digest}")),
        Err(e) => lines.push(format!("Digest unavailable: {e}")),
    }
    lines
}

pub fn print_plan(plan: &PagePlan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

pub fn print_build_output(summary: &BuildSummary) {
    for line in format_build_output(summary) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{EntryIssue, IssueKind, Snapshot};
    use crate::pipeline::plan;
    use crate::test_helpers::*;

    fn sample_plan() -> PagePlan {
        let snapshot = Snapshot {
            entries: vec![
                entry("a", "2024-05-02").category("travel").tags(&["t1"]).build(),
                entry("b", "2024-05-01").category("travel").build(),
            ],
            issues: vec![EntryIssue {
                id: "bad".into(),
                kind: IssueKind::MalformedDate("someday".into()),
            }],
        };
        plan(&snapshot, ts("2024-06-01T00:00:00Z"), &SiteConfig::default())
    }

    #[test]
    fn index_is_zero_padded() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn plan_lists_pipelines_with_counts() {
        let lines = format_plan(&sample_plan());
        assert!(lines.contains(&"Entries (2 pages)".to_string()));
        assert!(lines.contains(&"Posts (1 page)".to_string()));
        assert!(lines.contains(&"Categories (1 page)".to_string()));
        assert!(lines.contains(&"Authors (0 pages)".to_string()));
    }

    #[test]
    fn entry_lines_show_path_template_and_neighbours() {
        let lines = format_plan(&sample_plan());
        assert!(lines.contains(&"001 /a → article".to_string()));
        assert!(lines.contains(&"    Previous: b".to_string()));
        assert!(lines.contains(&"    Tags: t1".to_string()));
        assert!(lines.contains(&"    Next: a".to_string()));
    }

    #[test]
    fn listing_lines_show_window_position() {
        let lines = format_plan(&sample_plan());
        assert!(lines.contains(&"001 /category/travel → collection.category".to_string()));
        assert!(lines.contains(&"    travel, page 1 of 1, 2 entries".to_string()));
    }

    #[test]
    fn composite_line_counts_groups() {
        let lines = format_plan(&sample_plan());
        assert!(lines.contains(&"    Composite: 0 featured, 2 recent, 1 group".to_string()));
    }

    #[test]
    fn issues_section_lists_excluded_entries() {
        let lines = format_plan(&sample_plan());
        assert!(lines.contains(&"Issues".to_string()));
        assert!(
            lines
                .iter()
                .any(|l| l.contains("bad") && l.contains("malformed date"))
        );
    }

    #[test]
    fn build_output_ends_with_totals_and_digest() {
        let plan = sample_plan();
        let created = plan.len();
        let lines = format_build_output(&BuildSummary { plan, created });
        let n = lines.len();
        assert_eq!(lines[n - 2], "Generated 4 pages at 2024-06-01T00:00:00Z");
        assert!(lines[n - 1].starts_with("Digest: "));
    }
}
