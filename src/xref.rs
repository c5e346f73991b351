//! Cross-reference keys for related-content lookups.
//!
//! Each entry page carries its category id and tag ids so the rendering
//! layer can run its own "related content" query. The keys are opaque here.

use crate::types::ContentEntry;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrossRefKeys {
    pub category_id: Option<String>,
    /// Store order, dangling (`None`) references dropped. Never absent.
    pub tag_ids: Vec<String>,
    pub has_tags: bool,
}

pub fn resolve_keys(entry: &ContentEntry) -> CrossRefKeys {
    let tag_ids: Vec<String> = entry.tags.iter().flatten().map(|t| t.id.clone()).collect();
    CrossRefKeys {
        category_id: entry.category.as_ref().map(|c| c.id.clone()),
        has_tags: !tag_ids.is_empty(),
        tag_ids,
    }
}
