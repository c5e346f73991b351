//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! rendered to a TOML value and the user's file is merged on top, so a config
//! file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [entries]
//! template = "article"
//!
//! [posts]
//! base_path = "/"
//! template = "posts"
//! paginate = false          # false = grouped composite home page
//! items_per_page = 6
//! featured_limit = 10
//! recent_limit = 6
//!
//! [category]
//! base_path = "/category"
//! template = "collection.category"
//! items_per_page = 6
//!
//! [author]
//! base_path = "/author"
//! template = "collection.author"
//! items_per_page = 6
//!
//! [groups]
//! group_limit = 10          # Max category groups on the composite page
//! member_limit = 10         # Max entries per group
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The resolved [`SiteConfig`] is immutable and passed down explicitly to
//! every pipeline. Nothing reads configuration from global state.

use crate::group::GroupLimits;
use crate::types::TemplateId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

const DEFAULT_ITEMS_PER_PAGE: NonZeroUsize = NonZeroUsize::new(6).unwrap();

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Individual entry pages.
    pub entries: EntriesConfig,
    /// Home/posts listing.
    pub posts: PostsConfig,
    /// Per-category collections.
    pub category: CollectionConfig,
    /// Per-author collections.
    pub author: CollectionConfig,
    /// Composite listing group caps.
    pub groups: GroupsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            entries: EntriesConfig::default(),
            posts: PostsConfig::default(),
            category: CollectionConfig::default_category(),
            author: CollectionConfig::default_author(),
            groups: GroupsConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, path) in [
            ("posts.base_path", &self.posts.base_path),
            ("category.base_path", &self.category.base_path),
            ("author.base_path", &self.author.base_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "{key} must start with '/'"
                )));
            }
            if crate::paths::checked_path(path).is_none() {
                return Err(ConfigError::Validation(format!(
                    "{key} must not contain '.' or '..' segments"
                )));
            }
        }
        if crate::paths::normalize_path(&self.category.base_path)
            == crate::paths::normalize_path(&self.author.base_path)
        {
            return Err(ConfigError::Validation(
                "category.base_path and author.base_path must differ".into(),
            ));
        }
        for (key, template) in [
            ("entries.template", &self.entries.template),
            ("posts.template", &self.posts.template),
            ("category.template", &self.category.template),
            ("author.template", &self.author.template),
        ] {
            if template.0.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.groups.group_limit == 0 || self.groups.member_limit == 0 {
            return Err(ConfigError::Validation(
                "groups.group_limit and groups.member_limit must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Individual entry page settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntriesConfig {
    pub template: TemplateId,
}

impl Default for EntriesConfig {
    fn default() -> Self {
        Self {
            template: TemplateId::new("article"),
        }
    }
}

/// Home/posts listing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    pub base_path: String,
    pub template: TemplateId,
    /// Paginated listing windows instead of the grouped composite page.
    pub paginate: bool,
    /// Window size when `paginate` is on.
    pub items_per_page: NonZeroUsize,
    /// Featured entries shown on the composite page.
    pub featured_limit: usize,
    /// Recent entries shown on the composite page.
    pub recent_limit: usize,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            template: TemplateId::new("posts"),
            paginate: false,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            featured_limit: 10,
            recent_limit: 6,
        }
    }
}

/// Paginated collection settings (category or author).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
    pub base_path: String,
    pub template: TemplateId,
    pub items_per_page: NonZeroUsize,
}

impl CollectionConfig {
    pub fn default_category() -> Self {
        Self {
            base_path: "/category".to_string(),
            template: TemplateId::new("collection.category"),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }

    pub fn default_author() -> Self {
        Self {
            base_path: "/author".to_string(),
            template: TemplateId::new("collection.author"),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self::default_category()
    }
}

/// Composite listing group caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupsConfig {
    pub group_limit: usize,
    pub member_limit: usize,
}

impl Default for GroupsConfig {
    fn default() -> Self {
        let limits = GroupLimits::default();
        Self {
            group_limit: limits.groups,
            member_limit: limits.members,
        }
    }
}

impl GroupsConfig {
    pub fn limits(&self) -> GroupLimits {
        GroupLimits {
            groups: self.group_limit,
            members: self.member_limit,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of worker threads for the listing pipelines.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Pages Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Individual entry pages (one per published entry, at the entry's slug)
# ---------------------------------------------------------------------------
[entries]
template = "article"

# ---------------------------------------------------------------------------
# Home / posts listing
# ---------------------------------------------------------------------------
[posts]
base_path = "/"
template = "posts"

# true  = paginated listing: /, /page/2, /page/3, ...
# false = one composite page with featured, recent, and per-category groups
paginate = false

# Entries per listing window (used when paginate = true).
items_per_page = 6

# Featured and recent entries on the composite page.
featured_limit = 10
recent_limit = 6

# ---------------------------------------------------------------------------
# Category collections: /category/<slug>, /category/<slug>/page/2, ...
# ---------------------------------------------------------------------------
[category]
base_path = "/category"
template = "collection.category"
items_per_page = 6

# ---------------------------------------------------------------------------
# Author collections: /author/<slug>, /author/<slug>/page/2, ...
# ---------------------------------------------------------------------------
[author]
base_path = "/author"
template = "collection.author"
items_per_page = 6

# ---------------------------------------------------------------------------
# Composite page grouping
# ---------------------------------------------------------------------------
[groups]
# Maximum number of category groups.
group_limit = 10
# Maximum entries shown per group.
member_limit = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum worker threads for the listing pipelines.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_paths() {
        let config = SiteConfig::default();
        assert_eq!(config.posts.base_path, "/");
        assert_eq!(config.category.base_path, "/category");
        assert_eq!(config.author.base_path, "/author");
    }

    #[test]
    fn default_group_limits_are_ten() {
        let config = SiteConfig::default();
        assert_eq!(config.groups.limits(), GroupLimits::default());
        assert_eq!(config.groups.group_limit, 10);
        assert_eq!(config.groups.member_limit, 10);
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn stock_toml_parses_to_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, SiteConfig::default());
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn partial_author_section_keeps_author_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[author]\nitems_per_page = 3\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.author.items_per_page.get(), 3);
        assert_eq!(config.author.base_path, "/author");
        assert_eq!(config.author.template, TemplateId::new("collection.author"));
        assert_eq!(config.category, CollectionConfig::default_category());
    }

    #[test]
    fn load_config_reads_posts_section() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[posts]
paginate = true
items_per_page = 4
base_path = "/blog"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.posts.paginate);
        assert_eq!(config.posts.items_per_page.get(), 4);
        assert_eq!(config.posts.base_path, "/blog");
        assert_eq!(config.posts.recent_limit, 6);
    }

    #[test]
    fn zero_items_per_page_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[posts]\nitems_per_page = 0\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("unknown_key = \"value\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[groups]\nmax_groups = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_base_path_needs_leading_slash() {
        let mut config = SiteConfig::default();
        config.category.base_path = "category".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("category.base_path")
        ));
    }

    #[test]
    fn validate_base_path_rejects_dot_segments() {
        let mut config = SiteConfig::default();
        config.posts.base_path = "/../outside".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("posts.base_path")
        ));
    }

    #[test]
    fn validate_collection_base_paths_differ() {
        let mut config = SiteConfig::default();
        config.author.base_path = "/category/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_template() {
        let mut config = SiteConfig::default();
        config.entries.template = TemplateId::new(" ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_group_limit() {
        let mut config = SiteConfig::default();
        config.groups.group_limit = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[t]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\ny = 5\nz = 6").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(5));
        assert_eq!(merged["t"]["z"].as_integer(), Some(6));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(100_000),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
