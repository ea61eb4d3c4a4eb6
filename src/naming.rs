//! Post filename parsing for the `NNN-slug.md` convention.
//!
//! Posts are markdown files whose stem may carry a numeric prefix:
//!
//! - `012-hello-world.md` → entry 12, slug `hello-world`
//! - `drafts-and-notes.md` → no entry number, slug `drafts-and-notes`
//!
//! The entry number doubles as the post's footnote scope, so the footnotes of
//! post 12 get ids like `footnote-12-1` and would not clash with another
//! post's if their bodies were combined on one page. It also orders the
//! index, newest (highest number) first.
//!
//! Dashes in the slug become spaces in the fallback display title, used when
//! a post has neither a front matter title nor a `# heading`.

/// Result of parsing a post file stem like `012-hello-world`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostName {
    /// Entry number if present (e.g., `12` from `012-hello-world`).
    pub number: Option<u32>,
    /// URL slug: the stem without its number prefix. Falls back to the number
    /// itself for number-only stems (`007` → `007`).
    pub slug: String,
    /// Slug with dashes converted to spaces.
    pub display_title: String,
}

/// Parse a post file stem following the `NNN-slug` convention.
///
/// - `"012-hello-world"` → number=Some(12), slug="hello-world", display_title="hello world"
/// - `"007"` / `"007-"` → number=Some(7), slug="007", display_title="007"
/// - `"about"` → number=None, slug="about", display_title="about"
/// - `"2024notes"` → number=None (no dash after the digits)
pub fn parse_post_name(stem: &str) -> PostName {
    let (number, rest) = match stem.split_once('-') {
        Some((prefix, rest)) if is_number(prefix) => (prefix.parse::<u32>().ok(), rest),
        _ if is_number(stem) => (stem.parse::<u32>().ok(), ""),
        _ => (None, stem),
    };

    let slug = if rest.is_empty() {
        stem.trim_end_matches('-').to_string()
    } else {
        rest.to_string()
    };

    PostName {
        number,
        display_title: slug.replace('-', " "),
        slug,
    }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_multi_word_slug() {
        let p = parse_post_name("012-hello-world");
        assert_eq!(p.number, Some(12));
        assert_eq!(p.slug, "hello-world");
        assert_eq!(p.display_title, "hello world");
    }

    #[test]
    fn number_only_keeps_number_as_slug() {
        let p = parse_post_name("007");
        assert_eq!(p.number, Some(7));
        assert_eq!(p.slug, "007");
    }

    #[test]
    fn number_with_trailing_dash() {
        let p = parse_post_name("007-");
        assert_eq!(p.number, Some(7));
        assert_eq!(p.slug, "007");
    }

    #[test]
    fn unnumbered_slug() {
        let p = parse_post_name("about");
        assert_eq!(p.number, None);
        assert_eq!(p.slug, "about");
        assert_eq!(p.display_title, "about");
    }

    #[test]
    fn unnumbered_with_dashes() {
        let p = parse_post_name("wip-drafts");
        assert_eq!(p.number, None);
        assert_eq!(p.slug, "wip-drafts");
        assert_eq!(p.display_title, "wip drafts");
    }

    #[test]
    fn digits_without_dash_are_not_a_prefix() {
        let p = parse_post_name("2024notes");
        assert_eq!(p.number, None);
        assert_eq!(p.slug, "2024notes");
    }

    #[test]
    fn sign_is_not_a_number() {
        let p = parse_post_name("+1-post");
        assert_eq!(p.number, None);
        assert_eq!(p.slug, "+1-post");
    }

    #[test]
    fn zero_prefix() {
        let p = parse_post_name("000-first");
        assert_eq!(p.number, Some(0));
        assert_eq!(p.slug, "first");
    }
}
