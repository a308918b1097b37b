//! Inline mark parsing: one line of text into mark-attributed spans.
//!
//! The algorithm is pass-based, mirroring the regex-split approach of the
//! original importers: code runs are carved out first (raw zones), then
//! `**bold**`, then `*italic*`, then inline links within whatever runs
//! remain (including already-marked ones, so a bolded link keeps both).
//! Marks are additive across passes over disjoint text runs, so
//! `**bold with *italic* inside**` attributes both marks to the inner run,
//! but a true nested-span algebra is not attempted: an overlapping
//! bold+italic pair that shares a delimiter (`***x***`) is not reliably
//! detected, and a delimiter pair inside link text splits the link syntax
//! before the link pass sees it. Known limitations, kept deliberately for
//! parity with the documents already in the store.
//!
//! A delimiter with no matching closer on the same line is literal text,
//! never a mark boundary.

use std::sync::OnceLock;

use regex::Regex;

use crate::keys::KeyGen;
use crate::model::{MarkDef, MarkDefKind, Span};

/// Inline parse result: spans plus any link mark definitions they reference.
#[derive(Debug, Clone)]
pub struct InlineContent {
    pub spans: Vec<Span>,
    pub mark_defs: Vec<MarkDef>,
}

/// A text run mid-pass. `raw` runs (code) are closed to further passes.
#[derive(Debug, Clone)]
struct Seg {
    text: String,
    marks: Vec<String>,
    raw: bool,
}

fn link_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("invalid link regex"))
}

/// Parses one run of text (structural markers already stripped) into spans.
///
/// Output is never empty: empty input yields a single empty unmarked span,
/// because every text-bearing block must have at least one child.
pub fn parse_inline(text: &str, keys: &mut KeyGen) -> InlineContent {
    if text.is_empty() {
        return InlineContent {
            spans: vec![Span::plain("", keys)],
            mark_defs: Vec::new(),
        };
    }

    let mut segs = vec![Seg {
        text: text.to_string(),
        marks: Vec::new(),
        raw: false,
    }];
    let mut mark_defs = Vec::new();

    segs = code_pass(segs);
    segs = delimiter_pass(segs, "**", "strong");
    segs = delimiter_pass(segs, "*", "em");
    segs = link_pass(segs, &mut mark_defs, keys);

    let spans: Vec<Span> = merge_adjacent(segs)
        .into_iter()
        .filter(|s| !s.text.is_empty())
        .map(|s| {
            let text = if s.raw {
                s.text
            } else {
                unescape_plain(&s.text)
            };
            Span::new(text, s.marks, keys)
        })
        .collect();

    InlineContent {
        spans: if spans.is_empty() {
            vec![Span::plain("", keys)]
        } else {
            spans
        },
        mark_defs,
    }
}

/// Carves `` `code` `` runs out as raw segments.
fn code_pass(segs: Vec<Seg>) -> Vec<Seg> {
    let mut out = Vec::new();
    for seg in segs {
        if seg.raw {
            out.push(seg);
            continue;
        }
        for (piece, matched) in split_on_delimiter(&seg.text, "`") {
            let mut marks = seg.marks.clone();
            if matched {
                marks.push("code".to_string());
            }
            out.push(Seg {
                text: piece,
                marks,
                raw: matched,
            });
        }
    }
    out
}

/// Extracts `[text](href)` into link-marked segments plus mark definitions.
fn link_pass(segs: Vec<Seg>, mark_defs: &mut Vec<MarkDef>, keys: &mut KeyGen) -> Vec<Seg> {
    let mut out = Vec::new();
    for seg in segs {
        if seg.raw {
            out.push(seg);
            continue;
        }
        let mut last = 0;
        for caps in link_pattern().captures_iter(&seg.text) {
            let whole = caps.get(0).expect("capture 0 always present");
            if whole.start() > last {
                out.push(Seg {
                    text: seg.text[last..whole.start()].to_string(),
                    marks: seg.marks.clone(),
                    raw: false,
                });
            }
            let def_key = keys.next("link");
            mark_defs.push(MarkDef {
                key: def_key.clone(),
                kind: MarkDefKind::Link {
                    href: caps[2].to_string(),
                },
            });
            let mut marks = seg.marks.clone();
            marks.push(def_key);
            out.push(Seg {
                text: caps[1].to_string(),
                marks,
                raw: false,
            });
            last = whole.end();
        }
        if last < seg.text.len() {
            out.push(Seg {
                text: seg.text[last..].to_string(),
                marks: seg.marks,
                raw: false,
            });
        } else if last == 0 {
            out.push(seg);
        }
    }
    out
}

/// Splits non-raw segments on a symmetric delimiter, tagging matched runs.
fn delimiter_pass(segs: Vec<Seg>, delim: &str, mark: &str) -> Vec<Seg> {
    let mut out = Vec::new();
    for seg in segs {
        if seg.raw || seg.marks.iter().any(|m| m == mark) {
            out.push(seg);
            continue;
        }
        for (piece, matched) in split_on_delimiter(&seg.text, delim) {
            let mut marks = seg.marks.clone();
            if matched {
                marks.push(mark.to_string());
            }
            out.push(Seg {
                text: piece,
                marks,
                raw: seg.raw,
            });
        }
    }
    out
}

/// Drops the backslash from `\#`, `\[`, `\]`, `\{`, `\}`, the escapes the
/// markdown serializer writes for structural characters in plain text.
/// Code runs are never escaped, so they skip this.
fn unescape_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('#' | '[' | ']' | '{' | '}')) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Coalesces neighbouring runs left with identical marks, so literal
/// delimiter fragments split across passes come back as one span.
fn merge_adjacent(segs: Vec<Seg>) -> Vec<Seg> {
    let mut out: Vec<Seg> = Vec::new();
    for seg in segs {
        match out.last_mut() {
            Some(last) if last.marks == seg.marks && last.raw == seg.raw => {
                last.text.push_str(&seg.text);
            }
            _ => out.push(seg),
        }
    }
    out
}

/// Splits `text` on non-greedy `delim…delim` pairs.
///
/// Returns `(piece, matched)` in source order. An opener with an empty
/// interior is emitted as literal text and scanning resumes after it; an
/// opener with no closer makes the whole remainder literal.
fn split_on_delimiter(text: &str, delim: &str) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    let mut rest = text;
    loop {
        let Some(open) = rest.find(delim) else {
            if !rest.is_empty() {
                out.push((rest.to_string(), false));
            }
            break;
        };
        let after = &rest[open + delim.len()..];
        let Some(close) = after.find(delim) else {
            // Unmatched opener: everything left is literal.
            if !rest.is_empty() {
                out.push((rest.to_string(), false));
            }
            break;
        };
        if close == 0 {
            // Empty interior (e.g. `****`): opener is literal text.
            out.push((rest[..open + delim.len()].to_string(), false));
            rest = after;
            continue;
        }
        if open > 0 {
            out.push((rest[..open].to_string(), false));
        }
        out.push((after[..close].to_string(), true));
        rest = &after[close + delim.len()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spans(text: &str) -> Vec<(String, Vec<String>)> {
        let mut keys = KeyGen::deterministic();
        parse_inline(text, &mut keys)
            .spans
            .into_iter()
            .map(|s| (s.text, s.marks))
            .collect()
    }

    fn marks(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plain_text_is_one_unmarked_span() {
        assert_eq!(spans("hello world"), vec![("hello world".into(), vec![])]);
    }

    #[test]
    fn empty_input_yields_single_empty_span() {
        let mut keys = KeyGen::deterministic();
        let content = parse_inline("", &mut keys);
        assert_eq!(content.spans.len(), 1);
        assert_eq!(content.spans[0].text, "");
        assert!(content.spans[0].marks.is_empty());
    }

    #[test]
    fn bold_run_is_three_spans() {
        assert_eq!(
            spans("We saved **£250 per week**."),
            vec![
                ("We saved ".into(), vec![]),
                ("£250 per week".into(), marks(&["strong"])),
                (".".into(), vec![]),
            ]
        );
    }

    #[test]
    fn italic_run_is_tagged_em() {
        assert_eq!(
            spans("a *quiet* night"),
            vec![
                ("a ".into(), vec![]),
                ("quiet".into(), marks(&["em"])),
                (" night".into(), vec![]),
            ]
        );
    }

    #[test]
    fn italic_inside_bold_carries_both_marks() {
        assert_eq!(
            spans("**bold and *both* here**"),
            vec![
                ("bold and ".into(), marks(&["strong"])),
                ("both".into(), marks(&["strong", "em"])),
                (" here".into(), marks(&["strong"])),
            ]
        );
    }

    #[test]
    fn unmatched_delimiters_stay_literal() {
        assert_eq!(spans("2 * 3 = 6"), vec![("2 * 3 = 6".into(), vec![])]);
        assert_eq!(
            spans("**unclosed bold"),
            vec![("**unclosed bold".into(), vec![])]
        );
    }

    #[test]
    fn empty_interior_is_literal() {
        assert_eq!(spans("a ** b"), vec![("a ** b".into(), vec![])]);
    }

    #[test]
    fn escaped_structural_characters_lose_the_backslash() {
        assert_eq!(
            spans(r"use \#tags and \[brackets\]"),
            vec![("use #tags and [brackets]".into(), vec![])]
        );
    }

    #[test]
    fn escapes_inside_code_runs_stay_literal() {
        assert_eq!(
            spans(r"run `grep \[x\]` now"),
            vec![
                ("run ".into(), vec![]),
                (r"grep \[x\]".into(), marks(&["code"])),
                (" now".into(), vec![]),
            ]
        );
    }

    #[test]
    fn code_run_is_a_raw_zone() {
        assert_eq!(
            spans("run `npm install **fast**` now"),
            vec![
                ("run ".into(), vec![]),
                ("npm install **fast**".into(), marks(&["code"])),
                (" now".into(), vec![]),
            ]
        );
    }

    #[test]
    fn link_produces_mark_def() {
        let mut keys = KeyGen::deterministic();
        let content = parse_inline("see [our guide](https://example.com/guide) here", &mut keys);
        assert_eq!(content.mark_defs.len(), 1);
        let def = &content.mark_defs[0];
        assert_eq!(
            def.kind,
            MarkDefKind::Link {
                href: "https://example.com/guide".into()
            }
        );
        let texts: Vec<&str> = content.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["see ", "our guide", " here"]);
        assert_eq!(content.spans[1].marks, vec![def.key.clone()]);
    }

    #[test]
    fn bold_wrapping_a_link_keeps_both_marks() {
        let mut keys = KeyGen::deterministic();
        let content = parse_inline("Read **[our guide](https://example.com)** first.", &mut keys);

        let texts: Vec<&str> = content.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Read ", "our guide", " first."]);
        assert!(content.spans[0].marks.is_empty());
        assert!(content.spans[2].marks.is_empty());

        assert_eq!(content.mark_defs.len(), 1);
        let def_key = content.mark_defs[0].key.clone();
        assert_eq!(content.spans[1].marks, vec!["strong".to_string(), def_key]);
    }

    #[test]
    fn span_order_matches_source_order() {
        let out = spans("*a* then **b** then `c`");
        let texts: Vec<&str> = out.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["a", " then ", "b", " then ", "c"]);
    }

    #[test]
    fn spans_concatenate_back_to_plain_text() {
        let input = "We saved **£250** on *stock* and `waste`.";
        let joined: String = spans(input).into_iter().map(|(t, _)| t).collect();
        assert_eq!(joined, "We saved £250 on stock and waste.");
    }
}
