//! Loading a single post from disk.
//!
//! A post is a markdown file, optionally opening with a `+++`-fenced TOML
//! front matter block:
//!
//! ```text
//! +++
//! title = "Hello"
//! date = "2026-10-01"
//! tags = ["meta"]
//! +++
//!
//! # Hello
//!
//! First post.[^1]
//!
//! [^1]: With a footnote.
//! ```
//!
//! ## Title Resolution (first available wins)
//!
//! 1. `title` in front matter
//! 2. first top-level `# heading`
//! 3. filename display title (`012-hello-world.md` → "hello world")

use crate::naming::{PostName, parse_post_name};
use crate::pipeline::Pipeline;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Post has no file name: {0}")]
    NoFileName(PathBuf),
}

/// Post metadata from the `+++` block. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Free-form date string, shown as written.
    pub date: Option<String>,
    /// Drafts are checked but not published.
    pub draft: bool,
    pub tags: Vec<String>,
}

pub fn parse_front_matter(raw: &str) -> Result<FrontMatter, toml::de::Error> {
    toml::from_str(raw)
}

/// A post, rendered and ready for a page template.
#[derive(Debug, Clone)]
pub struct Post {
    pub source_path: PathBuf,
    pub name: PostName,
    pub title: String,
    pub front_matter: FrontMatter,
    /// Rendered body HTML (without page chrome).
    pub body_html: String,
    pub footnotes: usize,
}

impl Post {
    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }
}

/// Read and render one post. The entry number from the filename scopes its
/// footnote ids.
pub fn load_post(path: &Path, pipeline: &Pipeline) -> Result<Post, PostError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| PostError::NoFileName(path.to_path_buf()))?;
    let name = parse_post_name(&stem);

    let content = fs::read_to_string(path)?;
    let rendered = pipeline.render(&content, name.number);

    let front_matter = rendered
        .front_matter
        .as_deref()
        .map(parse_front_matter)
        .transpose()
        .map_err(|source| PostError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?
        .unwrap_or_default();

    let title = front_matter
        .title
        .clone()
        .or(rendered.title)
        .unwrap_or_else(|| name.display_title.clone());

    Ok(Post {
        source_path: path.to_path_buf(),
        name,
        title,
        front_matter,
        body_html: rendered.html,
        footnotes: rendered.footnotes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn front_matter_fields() {
        let fm = parse_front_matter(
            "title = \"Hi\"\ndate = \"2026-10-01\"\ndraft = true\ntags = [\"a\", \"b\"]\n",
        )
        .unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hi"));
        assert_eq!(fm.date.as_deref(), Some("2026-10-01"));
        assert!(fm.draft);
        assert_eq!(fm.tags, vec!["a", "b"]);
    }

    #[test]
    fn front_matter_rejects_unknown_keys() {
        assert!(parse_front_matter("titel = \"typo\"\n").is_err());
    }

    #[test]
    fn title_from_front_matter_wins() {
        let tmp = content_dir(&[(
            "012-hello-world.md",
            "+++\ntitle = \"From Front Matter\"\n+++\n\n# From Heading\n",
        )]);
        let post = load_post(&tmp.path().join("012-hello-world.md"), &Pipeline::default()).unwrap();
        assert_eq!(post.title, "From Front Matter");
        assert_eq!(post.name.number, Some(12));
        assert_eq!(post.name.slug, "hello-world");
    }

    #[test]
    fn title_from_heading() {
        let tmp = content_dir(&[("001-x.md", "# From Heading\n\nBody\n")]);
        let post = load_post(&tmp.path().join("001-x.md"), &Pipeline::default()).unwrap();
        assert_eq!(post.title, "From Heading");
    }

    #[test]
    fn title_from_filename() {
        let tmp = content_dir(&[("003-just-text.md", "Only a paragraph.\n")]);
        let post = load_post(&tmp.path().join("003-just-text.md"), &Pipeline::default()).unwrap();
        assert_eq!(post.title, "just text");
        assert!(!post.is_draft());
    }

    #[test]
    fn footnotes_scoped_by_entry_number() {
        let tmp = content_dir(&[("012-notes.md", "A claim.[^src]\n\n[^src]: A source.\n")]);
        let post = load_post(&tmp.path().join("012-notes.md"), &Pipeline::default()).unwrap();
        assert_eq!(post.footnotes, 1);
        assert!(post.body_html.contains(r#"id="footnote-12-1""#));
        assert!(post.body_html.contains(r#"id="footnote-ref-12-1""#));
    }

    #[test]
    fn bad_front_matter_is_reported_with_path() {
        let tmp = content_dir(&[("001-bad.md", "+++\ndraft = \"yes\"\n+++\n\nBody\n")]);
        let path = tmp.path().join("001-bad.md");
        let err = load_post(&path, &Pipeline::default()).unwrap_err();
        match err {
            PostError::FrontMatter { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = content_dir(&[]);
        let err = load_post(&tmp.path().join("001-nope.md"), &Pipeline::default()).unwrap_err();
        assert!(matches!(err, PostError::Io(_)));
    }
}
