//! Per-line classification: phase 1 of block parsing.

use std::sync::OnceLock;

use regex::Regex;

use super::ParseOptions;
use crate::model::ListKind;

/// Classification of a single line, containing only local facts.
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass {
    /// Empty or whitespace-only line. Never emitted as a block.
    Blank,
    Heading {
        level: u8,
        text: String,
    },
    ListItem {
        list: ListKind,
        /// Nesting depth; flat lists are level 1.
        level: u8,
        text: String,
    },
    Blockquote {
        text: String,
    },
    /// A ``` fence marker line (both opener and closer look the same here;
    /// the builder decides which it is from its own state).
    Fence {
        language: Option<String>,
    },
    Image {
        alt: String,
        src: String,
    },
    Paragraph {
        text: String,
    },
}

fn ordered_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.\s+(.*)$").expect("invalid ordered marker regex"))
}

fn image_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^!\[([^\]]*)\]\(([^)\s]+)\)$").expect("invalid image regex"))
}

/// Classifies individual lines according to the configured dialect.
pub struct LineClassifier {
    opts: ParseOptions,
}

impl LineClassifier {
    pub fn new(opts: ParseOptions) -> Self {
        Self { opts }
    }

    pub fn classify(&self, line: &str) -> LineClass {
        // Heading markers are matched on the untrimmed line: an indented
        // `#` is ordinary paragraph text, not a heading.
        if let Some(heading) = self.heading(line) {
            return heading;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineClass::Blank;
        }

        if self.opts.detect_code_fences
            && let Some(info) = trimmed.strip_prefix("```")
        {
            let info = info.trim();
            return LineClass::Fence {
                language: (!info.is_empty()).then(|| info.to_string()),
            };
        }

        if let Some(text) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            return LineClass::ListItem {
                list: ListKind::Unordered,
                level: indent_level(line),
                text: text.trim().to_string(),
            };
        }

        if let Some(caps) = ordered_marker().captures(trimmed) {
            return LineClass::ListItem {
                list: ListKind::Ordered,
                level: indent_level(line),
                text: caps[2].trim().to_string(),
            };
        }

        if let Some(text) = trimmed.strip_prefix('>') {
            return LineClass::Blockquote {
                text: text.trim().to_string(),
            };
        }

        if self.opts.detect_images
            && let Some(caps) = image_line().captures(trimmed)
        {
            return LineClass::Image {
                alt: caps[1].to_string(),
                src: caps[2].to_string(),
            };
        }

        LineClass::Paragraph {
            text: trimmed.to_string(),
        }
    }

    /// Heading detection on the untrimmed line. Counting the full `#` run
    /// means longer markers win over shorter prefixes, so `#### Text` is an
    /// h4 rather than an h1 with literal hashes in its text.
    fn heading(&self, line: &str) -> Option<LineClass> {
        let hashes = line.chars().take_while(|&c| c == '#').count();
        if hashes == 0 || hashes > usize::from(self.opts.max_heading_level) {
            return None;
        }
        let rest = &line[hashes..];
        let text = rest.strip_prefix(' ')?;
        Some(LineClass::Heading {
            level: hashes as u8,
            text: text.trim().to_string(),
        })
    }
}

/// List nesting level from the line's leading whitespace: two spaces or one
/// tab per extra level, flat lists at level 1.
fn indent_level(line: &str) -> u8 {
    let mut width = 0usize;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 2,
            _ => break,
        }
    }
    (1 + width / 2).min(u8::MAX as usize) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> LineClass {
        LineClassifier::new(ParseOptions::default()).classify(line)
    }

    #[test]
    fn blank_and_whitespace_only_lines_are_identical() {
        assert_eq!(classify(""), LineClass::Blank);
        assert_eq!(classify("   \t "), LineClass::Blank);
    }

    #[test]
    fn heading_levels_one_through_six() {
        for level in 1..=6u8 {
            let line = format!("{} Title", "#".repeat(level as usize));
            assert_eq!(
                classify(&line),
                LineClass::Heading {
                    level,
                    text: "Title".into()
                }
            );
        }
    }

    #[test]
    fn seven_hashes_is_not_a_heading() {
        assert!(matches!(
            classify("####### Too deep"),
            LineClass::Paragraph { .. }
        ));
    }

    #[test]
    fn hash_without_space_is_a_paragraph() {
        assert!(matches!(classify("#hashtag"), LineClass::Paragraph { .. }));
    }

    #[test]
    fn asterisk_and_dash_bullets_both_match() {
        assert_eq!(
            classify("- item"),
            LineClass::ListItem {
                list: ListKind::Unordered,
                level: 1,
                text: "item".into()
            }
        );
        assert_eq!(
            classify("* item"),
            LineClass::ListItem {
                list: ListKind::Unordered,
                level: 1,
                text: "item".into()
            }
        );
    }

    #[test]
    fn numbered_marker_matches_any_number() {
        assert_eq!(
            classify("12. twelfth"),
            LineClass::ListItem {
                list: ListKind::Ordered,
                level: 1,
                text: "twelfth".into()
            }
        );
    }

    #[test]
    fn number_without_dot_space_is_a_paragraph() {
        assert!(matches!(
            classify("1.starts tight"),
            LineClass::Paragraph { .. }
        ));
        assert!(matches!(classify("2024 revenue"), LineClass::Paragraph { .. }));
    }

    #[test]
    fn indented_bullets_gain_levels() {
        assert_eq!(
            classify("    - deep"),
            LineClass::ListItem {
                list: ListKind::Unordered,
                level: 3,
                text: "deep".into()
            }
        );
        assert_eq!(
            classify("\t- tabbed"),
            LineClass::ListItem {
                list: ListKind::Unordered,
                level: 2,
                text: "tabbed".into()
            }
        );
    }

    #[test]
    fn blockquote_with_and_without_space() {
        assert_eq!(
            classify("> quoted"),
            LineClass::Blockquote {
                text: "quoted".into()
            }
        );
        assert_eq!(
            classify(">tight"),
            LineClass::Blockquote {
                text: "tight".into()
            }
        );
    }

    #[test]
    fn fence_with_and_without_language() {
        assert_eq!(classify("```"), LineClass::Fence { language: None });
        assert_eq!(
            classify("```rust"),
            LineClass::Fence {
                language: Some("rust".into())
            }
        );
    }

    #[test]
    fn image_requires_full_line_match() {
        assert_eq!(
            classify("![alt text](/img/a.png)"),
            LineClass::Image {
                alt: "alt text".into(),
                src: "/img/a.png".into()
            }
        );
        assert!(matches!(
            classify("before ![alt](/img/a.png) after"),
            LineClass::Paragraph { .. }
        ));
    }
}
