//! Shared text utilities for CMS field limits.

/// Maximum length of the `excerpt` field.
pub const EXCERPT_MAX: usize = 155;
/// Maximum length of `seo.metaTitle`.
pub const META_TITLE_MAX: usize = 58;
/// Maximum length of `seo.metaDescription`.
pub const META_DESCRIPTION_MAX: usize = 155;
/// Maximum length of `quickAnswer` (conservative bound of the 75–80 band
/// the original scripts drifted across).
pub const QUICK_ANSWER_MAX: usize = 75;

/// Truncates `text` to at most `max` characters without splitting a word.
///
/// Returns the input unchanged when it already fits. Otherwise the cut is
/// made at the last space within the limit, trimmed; when no space exists
/// before the limit the cut is a hard one at `max`.
pub fn truncate_at_word(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    match head.rfind(' ') {
        Some(cut) => head[..cut].trim_end().to_string(),
        None => head.trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("The quick brown fox jumps", 10, "The quick")]
    #[case("The quick brown fox jumps", 25, "The quick brown fox jumps")]
    #[case("short", 155, "short")]
    #[case("supercalifragilistic", 8, "supercal")]
    #[case("a b", 1, "a")]
    #[case("", 10, "")]
    fn truncates_at_word_boundary(#[case] input: &str, #[case] max: usize, #[case] want: &str) {
        assert_eq!(truncate_at_word(input, max), want);
    }

    #[test]
    fn never_exceeds_limit_and_never_splits_words() {
        let text = "Running a successful pub quiz night takes planning, promotion and a good quizmaster";
        for max in 1..text.len() + 5 {
            let out = truncate_at_word(text, max);
            assert!(out.chars().count() <= max, "limit {max} exceeded: {out:?}");
            assert!(!out.ends_with(' '));
            // A word-boundary cut means the output, when shorter than the
            // input, must be a prefix ending exactly at a word edge unless
            // the first word itself did not fit.
            if out.len() < text.len() && text.as_bytes().get(out.len()) == Some(&b' ') {
                assert!(text.starts_with(&out));
            }
        }
    }

    #[test]
    fn no_space_before_limit_hard_truncates() {
        assert_eq!(truncate_at_word("wordswithoutspaces here", 5), "words");
    }
}
