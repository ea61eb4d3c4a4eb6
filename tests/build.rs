//! End-to-end site builds into a temporary output directory.

use mdpress::site::{self, SiteError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "config.toml", "title = \"Field Notes\"\n");
    write(
        root,
        "001-first.md",
        "# First\n\nA **strong** claim.[^1]\n\n[^1]: Citation needed.\n",
    );
    write(
        root,
        "002-second.md",
        "+++\ndate = \"2026-10-01\"\n+++\n\n# Second\n\nAnother claim.[^1]\n\n[^1]: Also cited.\n",
    );
    write(root, "003-wip.md", "+++\ndraft = true\n+++\n\n# Wip\n");
    write(
        root,
        "notes/config.toml",
        "[markdown]\nstrong_as_emphasis = false\n",
    );
    write(root, "notes/004-raw.md", "Keep **this** strong.\n");
    tmp
}

#[test]
fn build_writes_posts_and_index() {
    let content = sample_content();
    let out = TempDir::new().unwrap();

    let report = site::build(content.path(), out.path()).unwrap();

    let paths: Vec<String> = report
        .pages
        .iter()
        .map(|p| p.path.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        paths,
        vec![
            "index.html",
            "raw/index.html",
            "second/index.html",
            "first/index.html",
        ]
    );
    assert_eq!(report.drafts.len(), 1);
    assert!(!out.path().join("wip").exists());

    let index = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(index.contains("<title>Field Notes</title>"));
    assert!(index.contains(r#"href="/second/""#));
    assert!(!index.contains("Wip"));
}

#[test]
fn footnote_ids_are_scoped_per_post() {
    let content = sample_content();
    let out = TempDir::new().unwrap();
    site::build(content.path(), out.path()).unwrap();

    let first = fs::read_to_string(out.path().join("first/index.html")).unwrap();
    let second = fs::read_to_string(out.path().join("second/index.html")).unwrap();
    assert!(first.contains(r#"id="footnote-1-1""#));
    assert!(second.contains(r#"id="footnote-2-1""#));
    assert!(!second.contains("footnote-1-1"));
}

#[test]
fn directory_config_overrides_root() {
    let content = sample_content();
    let out = TempDir::new().unwrap();
    site::build(content.path(), out.path()).unwrap();

    let first = fs::read_to_string(out.path().join("first/index.html")).unwrap();
    let raw = fs::read_to_string(out.path().join("raw/index.html")).unwrap();
    assert!(first.contains("<em>strong</em>"));
    assert!(raw.contains("<strong>this</strong>"));
}

#[test]
fn duplicate_slugs_are_rejected() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "001-same.md", "a\n");
    write(tmp.path(), "sub/002-same.md", "b\n");

    let err = site::load_site(tmp.path()).unwrap_err();
    assert!(matches!(err, SiteError::DuplicateSlug { ref slug, .. } if slug == "same"));
}

#[test]
fn unknown_config_key_fails_the_build() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "config.toml", "[markdown]\nstrong_as_bold = true\n");
    write(tmp.path(), "001-a.md", "a\n");
    let out = TempDir::new().unwrap();

    assert!(matches!(
        site::build(tmp.path(), out.path()),
        Err(SiteError::Config(_))
    ));
}
