//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Configuration
//! is hierarchical: stock defaults are overridden by the root config file,
//! which is in turn overridden by config files in post subdirectories.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml              # Root config (overrides stock defaults)
//! ├── 001-hello.md
//! └── notes/
//!     ├── config.toml          # Applies to posts under notes/ (overrides root)
//!     └── 002-short.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "mdpress"          # Site title (root-level only)
//!
//! [markdown]
//! footnotes = true
//! tables = true
//! strikethrough = true
//! tasklists = true
//! smart_punctuation = false
//! allow_html = true          # Pass raw HTML in posts through
//! heading_ids = true         # Slug ids on headings
//! elide_empty_paragraphs = true
//! strong_as_emphasis = true  # Render **bold** as <em>
//!
//! [footnotes]
//! label = "Footnotes"
//! back_label = "Back to reference"
//! back_content = "↩"
//!
//! [processing]
//! max_processes = 4          # Omit for one worker per core
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::convert::ConvertOptions;
use crate::mdast::ParseOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, shown in page titles and the index heading.
    pub title: String,
    /// Markdown parsing and rendering switches.
    pub markdown: MarkdownConfig,
    /// Footnote section wording.
    pub footnotes: FootnotesConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "mdpress".to_string(),
            markdown: MarkdownConfig::default(),
            footnotes: FootnotesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if self.footnotes.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "footnotes.label must not be empty".into(),
            ));
        }
        if self.footnotes.back_content.is_empty() {
            return Err(ConfigError::Validation(
                "footnotes.back_content must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        let md = &self.markdown;
        ParseOptions {
            footnotes: md.footnotes,
            tables: md.tables,
            strikethrough: md.strikethrough,
            tasklists: md.tasklists,
            smart_punctuation: md.smart_punctuation,
        }
    }

    /// Converter options; the footnote scope is per post and starts unset.
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            footnote_scope: None,
            allow_html: self.markdown.allow_html,
            heading_ids: self.markdown.heading_ids,
            footnote_label: self.footnotes.label.clone(),
            footnote_back_label: self.footnotes.back_label.clone(),
            footnote_back_content: self.footnotes.back_content.clone(),
        }
    }
}

/// Markdown parsing and rendering switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// `[^label]` footnotes.
    pub footnotes: bool,
    /// GFM pipe tables.
    pub tables: bool,
    /// `~~strikethrough~~`.
    pub strikethrough: bool,
    /// `- [x]` task lists.
    pub tasklists: bool,
    /// Curly quotes, dashes and ellipses.
    pub smart_punctuation: bool,
    /// Pass raw HTML from posts through to the page.
    pub allow_html: bool,
    /// Give headings slug ids for anchor links.
    pub heading_ids: bool,
    /// Drop paragraphs that contain only whitespace.
    pub elide_empty_paragraphs: bool,
    /// Render `**strong**` as `<em>` instead of `<strong>`.
    pub strong_as_emphasis: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            footnotes: true,
            tables: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
            allow_html: true,
            heading_ids: true,
            elide_empty_paragraphs: true,
            strong_as_emphasis: true,
        }
    }
}

/// Footnote section wording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FootnotesConfig {
    /// Heading of the footnote section (visually hidden).
    pub label: String,
    /// `aria-label` prefix of back-links; the footnote number is appended.
    pub back_label: String,
    /// Visible text of back-links.
    pub back_content: String,
}

impl Default for FootnotesConfig {
    fn default() -> Self {
        Self {
            label: "Footnotes".to_string(),
            back_label: "Back to reference".to_string(),
            back_content: "↩".to_string(),
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel rendering workers.
    /// When absent or null, defaults to the number of CPU cores.
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
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer every user override is merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
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

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
///
/// Used to resolve a fully-merged config at any point in the directory hierarchy.
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

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r###"# mdpress Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Config files can be placed in the content root and in any subdirectory:
#   content/config.toml        -> root (overrides stock defaults)
#   content/notes/config.toml  -> posts under notes/ (overrides root)
#
# Each level only needs the keys it wants to override.
# Unknown keys will cause an error.

# Site title, used in page titles and on the index page (root-level only).
title = "mdpress"

# ---------------------------------------------------------------------------
# Markdown
# ---------------------------------------------------------------------------
[markdown]
# Parser extensions.
footnotes = true
tables = true
strikethrough = true
tasklists = true
smart_punctuation = false

# Pass raw HTML written in posts through to the page. When false it is dropped.
allow_html = true

# Give headings slug ids ("## Hello World" -> id="hello-world").
heading_ids = true

# Drop paragraphs that contain nothing but whitespace.
elide_empty_paragraphs = true

# Render **bold** source markup as <em> instead of <strong>.
strong_as_emphasis = true

# ---------------------------------------------------------------------------
# Footnotes
# ---------------------------------------------------------------------------
[footnotes]
# Heading of the footnote section (visually hidden, read by screen readers).
label = "Footnotes"

# aria-label of the links back to the text; the footnote number is appended.
back_label = "Back to reference"

# Visible text of those links.
back_content = "↩"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel rendering workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"###
}
