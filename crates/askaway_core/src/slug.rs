//! crates/askaway_core/src/slug.rs
//!
//! Derivation of URL-safe slugs from question titles.

/// Produces a URL-safe slug: ASCII alphanumerics lowercased, every run of
/// other characters collapsed into a single hyphen, no leading or trailing
/// hyphen. The result may be empty for titles without ASCII alphanumerics.
///
/// The slug is a pure function of the title; saving a question always
/// recomputes it, so editing the title changes the slug. Two questions with
/// identical titles share a slug, which is why lookups go by id and the slug
/// only decorates the URL.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Why is the sky blue?"), "why-is-the-sky-blue");
    }

    #[test]
    fn collapses_runs_of_punctuation_and_whitespace() {
        assert_eq!(slugify("C++ -- or Rust??  (2024)"), "c-or-rust-2024");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  hello world  "), "hello-world");
        assert_eq!(slugify("!!important!!"), "important");
    }

    #[test]
    fn non_ascii_is_dropped() {
        assert_eq!(slugify("héllo wörld"), "hllo-wrld");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn empty_title_yields_empty_slug() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn identical_titles_share_a_slug() {
        assert_eq!(slugify("Same title"), slugify("Same title"));
    }
}
