//! Site loading and HTML generation.
//!
//! Walks a content directory for posts, renders them in parallel, and writes
//! one page per published post plus an index.
//!
//! ## Content Structure
//!
//! ```text
//! content/
//! ├── config.toml              # Site config (optional)
//! ├── 001-hello.md             # Post 1 → dist/hello/index.html
//! ├── 002-footnotes.md         # Post 2 → dist/footnotes/index.html
//! ├── about.md                 # Unnumbered post → dist/about/index.html
//! └── notes/
//!     ├── config.toml          # Overrides for posts under notes/
//!     └── 003-short.md         # Post 3 → dist/short/index.html
//! ```
//!
//! Directories and files starting with `.` or `_` are skipped. Slugs must be
//! unique across the whole tree, since all posts land at the output root.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html               # Published posts, highest entry number first
//! ├── hello/index.html
//! └── footnotes/index.html
//! ```
//!
//! Posts with `draft = true` in their front matter are rendered (so `check`
//! still validates them) but not written.

use crate::config::{
    self, CONFIG_FILE, ConfigError, SiteConfig, load_raw_config, merge_toml, resolve_config,
};
use crate::pipeline::Pipeline;
use crate::post::{Post, PostError, load_post};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Post error: {0}")]
    Post(#[from] PostError),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Slug '{slug}' of {path} cannot be used as an output directory")]
    InvalidSlug { slug: String, path: PathBuf },
    #[error("Duplicate slug '{slug}': {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Every post under a content root, rendered.
#[derive(Debug)]
pub struct Site {
    pub config: SiteConfig,
    /// Sorted for the index: numbered posts by descending number, then
    /// unnumbered posts by slug.
    pub posts: Vec<Post>,
}

impl Site {
    pub fn published(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| !p.is_draft())
    }

    pub fn drafts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|p| p.is_draft())
    }
}

/// A page written by [`build`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenPage {
    pub title: String,
    /// Output path relative to the output directory.
    pub path: PathBuf,
    pub footnotes: usize,
}

#[derive(Debug)]
pub struct BuildReport {
    pub pages: Vec<WrittenPage>,
    /// Source paths of skipped drafts.
    pub drafts: Vec<PathBuf>,
}

const CSS: &str = include_str!("../static/style.css");

/// Collect markdown files under `root`, in path order.
pub fn scan_posts(root: &Path) -> Result<Vec<PathBuf>, SiteError> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        let is_md = entry
            .path()
            .extension()
            .map(|e| e.eq_ignore_ascii_case("md"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_md {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.') || s.starts_with('_'))
        .unwrap_or(false)
}

/// Resolve the effective config for a directory inside `root`.
///
/// Stock defaults, then `root/config.toml`, then every `config.toml` on the
/// way down to `dir`.
pub fn resolve_dir_config(root: &Path, dir: &Path) -> Result<SiteConfig, SiteError> {
    let mut value = config::stock_defaults_value()?;
    if let Some(overlay) = load_raw_config(root)? {
        value = merge_toml(value, overlay);
    }
    if let Ok(rel) = dir.strip_prefix(root) {
        let mut current = root.to_path_buf();
        for component in rel.components() {
            current.push(component);
            if let Some(overlay) = load_raw_config(&current)? {
                debug!(dir = %current.display(), "applying {CONFIG_FILE}");
                value = merge_toml(value, overlay);
            }
        }
    }
    Ok(resolve_config(value, None)?)
}

/// Effective config for a single markdown file.
///
/// Files under `root` get their directory's cascade; anything else gets the
/// root config, or the config next to the file when `root` does not exist.
/// Paths are compared canonically, so `./content/notes/x.md` and
/// `content/notes/x.md` resolve the same way.
pub fn config_for_file(root: &Path, file: &Path) -> Result<SiteConfig, SiteError> {
    let dir = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let dir = dir.canonicalize()?;
    match root.canonicalize() {
        Ok(root) if root.is_dir() && dir.starts_with(&root) => {
            resolve_dir_config(&root, &dir)
        }
        Ok(root) if root.is_dir() => Ok(config::load_config(&root)?),
        _ => Ok(config::load_config(&dir)?),
    }
}

/// Load and render every post under `root`.
pub fn load_site(root: &Path) -> Result<Site, SiteError> {
    let config = config::load_config(root)?;
    let paths = scan_posts(root)?;

    // One pipeline per directory holding posts.
    let mut pipelines: BTreeMap<PathBuf, Pipeline> = BTreeMap::new();
    for path in &paths {
        let dir = path.parent().unwrap_or(root).to_path_buf();
        if !pipelines.contains_key(&dir) {
            let dir_config = resolve_dir_config(root, &dir)?;
            pipelines.insert(dir, Pipeline::from_config(&dir_config));
        }
    }
    let default_pipeline = Pipeline::from_config(&config);

    let mut posts = paths
        .par_iter()
        .map(|path| {
            let pipeline = path
                .parent()
                .and_then(|dir| pipelines.get(dir))
                .unwrap_or(&default_pipeline);
            load_post(path, pipeline)
        })
        .collect::<Result<Vec<_>, _>>()?;

    for post in &posts {
        check_slug(post)?;
    }
    check_unique_slugs(&posts)?;
    posts.sort_by(|a, b| post_order(a).cmp(&post_order(b)));

    Ok(Site { config, posts })
}

fn post_order(post: &Post) -> (bool, Reverse<u32>, String) {
    (
        post.name.number.is_none(),
        Reverse(post.name.number.unwrap_or(0)),
        post.name.slug.clone(),
    )
}

/// Each slug becomes `{output}/{slug}/index.html`, so it must name exactly
/// one directory below the output root and must not shadow the index page.
fn check_slug(post: &Post) -> Result<(), SiteError> {
    let slug = post.name.slug.as_str();
    let valid = !matches!(slug, "" | "." | ".." | "index.html")
        && !slug.contains(['/', '\\'])
        && !slug.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(SiteError::InvalidSlug {
            slug: slug.to_string(),
            path: post.source_path.clone(),
        })
    }
}

fn check_unique_slugs(posts: &[Post]) -> Result<(), SiteError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for post in posts {
        if let Some(first) = seen.insert(&post.name.slug, &post.source_path) {
            return Err(SiteError::DuplicateSlug {
                slug: post.name.slug.clone(),
                first: first.to_path_buf(),
                second: post.source_path.clone(),
            });
        }
    }
    Ok(())
}

/// Render the site under `source` into `output`.
pub fn build(source: &Path, output: &Path) -> Result<BuildReport, SiteError> {
    let site = load_site(source)?;
    fs::create_dir_all(output)?;

    let mut pages = Vec::new();
    for post in site.published() {
        let rel = PathBuf::from(&post.name.slug).join("index.html");
        let dest = output.join(&rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, render_post_page(post, &site.config.title).into_string())?;
        info!(path = %dest.display(), "wrote post");
        pages.push(WrittenPage {
            title: post.title.clone(),
            path: rel,
            footnotes: post.footnotes,
        });
    }

    let drafts: Vec<PathBuf> = site.drafts().map(|p| p.source_path.clone()).collect();
    for draft in &drafts {
        warn!(path = %draft.display(), "skipping draft");
    }

    fs::write(output.join("index.html"), render_index(&site).into_string())?;
    pages.insert(
        0,
        WrittenPage {
            title: site.config.title.clone(),
            path: PathBuf::from("index.html"),
            footnotes: 0,
        },
    );

    Ok(BuildReport { pages, drafts })
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header linking back to the index
fn site_header(site_title: &str) -> Markup {
    html! {
        header.site-header {
            a href="/" { (site_title) }
        }
    }
}

fn post_meta(post: &Post) -> Markup {
    let fm = &post.front_matter;
    html! {
        @if fm.date.is_some() || !fm.tags.is_empty() {
            footer.post-meta {
                @if let Some(date) = &fm.date {
                    time { (date) }
                }
                @if !fm.tags.is_empty() {
                    ul.tags {
                        @for tag in &fm.tags {
                            li { (tag) }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders a post page; the body HTML comes from the pipeline.
pub fn render_post_page(post: &Post, site_title: &str) -> Markup {
    let page_title = format!("{} · {}", post.title, site_title);
    let content = html! {
        (site_header(site_title))
        main.post {
            article {
                (PreEscaped(&post.body_html))
                (post_meta(post))
            }
        }
    };
    base_document(&page_title, content)
}

/// Renders the index page listing published posts
pub fn render_index(site: &Site) -> Markup {
    let content = html! {
        (site_header(&site.config.title))
        main.index-page {
            h1 { (site.config.title) }
            ul.post-list {
                @for post in site.published() {
                    li {
                        a href={ "/" (post.name.slug) "/" } { (post.title) }
                        @if let Some(date) = &post.front_matter.date {
                            " "
                            time { (date) }
                        }
                    }
                }
            }
        }
    };
    base_document(&site.config.title, content)
}
