//! CLI output formatting for `check` and `build`.
//!
//! Output is information-centric: every post leads with its entry number and
//! title, with the source file as an indented `Source:` line.
//!
//! ## Check
//!
//! ```text
//! Posts
//! 004 Short
//!     Source: notes/004-short.md
//! 003 Draft (draft)
//!     Source: 003-draft.md
//! 002 Footnotes
//!     Source: 002-footnotes.md
//!     Footnotes: 2
//! --- About
//!     Source: about.md
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Build
//!
//! ```text
//! Field Notes → index.html
//! Short → short/index.html
//! Footnotes → footnotes/index.html
//!
//! Skipped 1 draft
//!     003-draft.md
//!
//! Generated 2 posts
//! ```
//!
//! Each `format_*` function returns lines for testability; the `print_*`
//! wrappers write them to stdout.

use crate::config::CONFIG_FILE;
use crate::post::Post;
use crate::site::{BuildReport, Site};
use std::path::Path;

/// Entry number as 3-digit zero-padded, or `---` for unnumbered posts.
fn format_number(number: Option<u32>) -> String {
    match number {
        Some(n) => format!("{:0>3}", n),
        None => "---".to_string(),
    }
}

/// Path relative to `root` when possible, for display.
fn display_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn post_lines(post: &Post, source_root: &Path) -> Vec<String> {
    let draft = if post.is_draft() { " (draft)" } else { "" };
    let mut lines = vec![format!(
        "{} {}{}",
        format_number(post.name.number),
        post.title,
        draft
    )];
    lines.push(format!(
        "    Source: {}",
        display_rel(&post.source_path, source_root)
    ));
    if post.footnotes > 0 {
        lines.push(format!("    Footnotes: {}", post.footnotes));
    }
    lines
}

/// Format `check` output: every post in index order, then config files.
pub fn format_check_output(site: &Site, source_root: &Path) -> Vec<String> {
    let mut lines = vec!["Posts".to_string()];
    for post in &site.posts {
        lines.extend(post_lines(post, source_root));
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join(CONFIG_FILE).exists() {
        lines.push(format!("    {}", CONFIG_FILE));
    } else {
        lines.push("    (defaults)".to_string());
    }
    lines
}

pub fn print_check_output(site: &Site, source_root: &Path) {
    for line in format_check_output(site, source_root) {
        println!("{}", line);
    }
}

/// Format `build` output: written pages, skipped drafts, and a summary.
pub fn format_build_output(report: &BuildReport, source_root: &Path) -> Vec<String> {
    let mut lines: Vec<String> = report
        .pages
        .iter()
        .map(|page| format!("{} → {}", page.title, page.path.display()))
        .collect();

    if !report.drafts.is_empty() {
        lines.push(String::new());
        let noun = if report.drafts.len() == 1 { "draft" } else { "drafts" };
        lines.push(format!("Skipped {} {}", report.drafts.len(), noun));
        for draft in &report.drafts {
            lines.push(format!("    {}", display_rel(draft, source_root)));
        }
    }

    // The index page is always first and is not a post.
    let posts = report.pages.len().saturating_sub(1);
    let noun = if posts == 1 { "post" } else { "posts" };
    lines.push(String::new());
    lines.push(format!("Generated {} {}", posts, noun));
    lines
}

pub fn print_build_output(report: &BuildReport, source_root: &Path) {
    for line in format_build_output(report, source_root) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::naming::parse_post_name;
    use crate::post::FrontMatter;
    use crate::site::WrittenPage;
    use std::path::PathBuf;

    fn post(stem: &str, title: &str, draft: bool, footnotes: usize) -> Post {
        Post {
            source_path: PathBuf::from(format!("/content/{stem}.md")),
            name: parse_post_name(stem),
            title: title.to_string(),
            front_matter: FrontMatter {
                draft,
                ..FrontMatter::default()
            },
            body_html: String::new(),
            footnotes,
        }
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(Some(4)), "004");
        assert_eq!(format_number(Some(1234)), "1234");
        assert_eq!(format_number(None), "---");
    }

    #[test]
    fn check_output_lists_posts() {
        let site = Site {
            config: SiteConfig::default(),
            posts: vec![
                post("002-notes", "Notes", false, 2),
                post("001-wip", "Wip", true, 0),
                post("about", "About", false, 0),
            ],
        };
        let lines = format_check_output(&site, Path::new("/content"));
        assert_eq!(
            &lines[..8],
            &[
                "Posts",
                "002 Notes",
                "    Source: 002-notes.md",
                "    Footnotes: 2",
                "001 Wip (draft)",
                "    Source: 001-wip.md",
                "--- About",
                "    Source: about.md",
            ]
        );
        assert_eq!(lines.last().map(String::as_str), Some("    (defaults)"));
    }

    #[test]
    fn build_output_summary() {
        let report = BuildReport {
            pages: vec![
                WrittenPage {
                    title: "Site".into(),
                    path: PathBuf::from("index.html"),
                    footnotes: 0,
                },
                WrittenPage {
                    title: "Notes".into(),
                    path: PathBuf::from("notes/index.html"),
                    footnotes: 2,
                },
            ],
            drafts: vec![PathBuf::from("/content/001-wip.md")],
        };
        let lines = format_build_output(&report, Path::new("/content"));
        assert_eq!(lines[0], "Site → index.html");
        assert_eq!(lines[1], "Notes → notes/index.html");
        assert!(lines.contains(&"Skipped 1 draft".to_string()));
        assert!(lines.contains(&"    001-wip.md".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Generated 1 post"));
    }

    #[test]
    fn build_output_without_drafts() {
        let report = BuildReport {
            pages: vec![WrittenPage {
                title: "Site".into(),
                path: PathBuf::from("index.html"),
                footnotes: 0,
            }],
            drafts: vec![],
        };
        let lines = format_build_output(&report, Path::new("/content"));
        assert!(!lines.iter().any(|l| l.starts_with("Skipped")));
        assert_eq!(lines.last().map(String::as_str), Some("Generated 0 posts"));
    }
}
