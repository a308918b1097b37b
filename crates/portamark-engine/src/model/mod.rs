//! Typed document model.
//!
//! Content flows through the pipeline as a tagged-variant block tree rather
//! than loosely shaped JSON, so that serializers match exhaustively over
//! [`BlockKind`] and a new kind is a compile-time extension point instead of
//! a silent no-op in an untyped traversal. Conversion to and from the CMS
//! wire shape (`_type`/`_key` tagged objects) lives in [`wire`].

pub mod document;
pub mod wire;

use serde::{Deserialize, Serialize};

use crate::keys::KeyGen;

/// Built-in span marks understood without a mark definition.
pub const BUILTIN_MARKS: [&str; 5] = ["strong", "em", "code", "underline", "strike"];

/// Whether a mark id is one of the built-in styles, as opposed to a
/// reference into a block's `markDefs`.
pub fn is_builtin_mark(mark: &str) -> bool {
    BUILTIN_MARKS.contains(&mark)
}

/// One paragraph-level unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "wire::WireBlock", into = "wire::WireBlock")]
pub struct Block {
    /// Unique within the containing `content` array (CMS diffing requirement).
    pub key: String,
    pub kind: BlockKind,
    /// Ordered text runs; reading order. Empty only for non-text kinds.
    pub children: Vec<Span>,
    /// Out-of-line annotations referenced by span mark ids.
    pub mark_defs: Vec<MarkDef>,
}

impl Block {
    /// New text-bearing block with a fresh key.
    pub fn new(kind: BlockKind, children: Vec<Span>, keys: &mut KeyGen) -> Self {
        Self {
            key: keys.next("block"),
            kind,
            children,
            mark_defs: Vec::new(),
        }
    }

    /// Concatenated plain text of all child spans, in order.
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }

    /// Looks up a non-built-in mark id in this block's mark definitions.
    pub fn mark_def(&self, mark: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|d| d.key == mark)
    }
}

/// The kind of a block, including per-kind payload.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Heading { level: u8 },
    Paragraph,
    Blockquote,
    ListItem { list: ListKind, level: u8 },
    Image { src: String, alt: String, caption: Option<String> },
    Code { language: Option<String>, code: String },
    ComparisonTable { rows: Vec<TableRow> },
}

impl BlockKind {
    /// Whether this kind carries inline spans.
    pub fn is_text_bearing(&self) -> bool {
        matches!(
            self,
            BlockKind::Heading { .. }
                | BlockKind::Paragraph
                | BlockKind::Blockquote
                | BlockKind::ListItem { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// Smallest text-bearing unit: a run of text with zero or more active marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename = "span")]
pub struct Span {
    #[serde(rename = "_key")]
    pub key: String,
    pub text: String,
    /// Built-in mark names or mark-definition keys, in applied order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<String>,
}

impl Span {
    pub fn new(text: impl Into<String>, marks: Vec<String>, keys: &mut KeyGen) -> Self {
        Self {
            key: keys.next("span"),
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>, keys: &mut KeyGen) -> Self {
        Self::new(text, Vec::new(), keys)
    }
}

/// Out-of-line mark annotation, referenced from spans by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(flatten)]
    pub kind: MarkDefKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "lowercase")]
pub enum MarkDefKind {
    Link { href: String },
}

/// One row of a comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(rename = "_key")]
    pub key: String,
    pub cells: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> KeyGen {
        KeyGen::deterministic()
    }

    #[test]
    fn plain_text_concatenates_children_in_order() {
        let mut keys = keys();
        let block = Block::new(
            BlockKind::Paragraph,
            vec![
                Span::plain("We saved ", &mut keys),
                Span::new("£250 per week", vec!["strong".into()], &mut keys),
                Span::plain(".", &mut keys),
            ],
            &mut keys,
        );
        assert_eq!(block.plain_text(), "We saved £250 per week.");
    }

    #[test]
    fn builtin_marks_are_recognized() {
        assert!(is_builtin_mark("strong"));
        assert!(is_builtin_mark("em"));
        assert!(is_builtin_mark("code"));
        assert!(!is_builtin_mark("link-abc123"));
    }

    #[test]
    fn text_bearing_kinds_carry_spans() {
        assert!(BlockKind::Paragraph.is_text_bearing());
        assert!(BlockKind::Heading { level: 2 }.is_text_bearing());
        assert!(
            !BlockKind::Code {
                language: None,
                code: String::new()
            }
            .is_text_bearing()
        );
    }

    #[test]
    fn mark_def_lookup_by_key() {
        let mut keys = keys();
        let mut block = Block::new(
            BlockKind::Paragraph,
            vec![Span::new("here", vec!["md-1".into()], &mut keys)],
            &mut keys,
        );
        block.mark_defs.push(MarkDef {
            key: "md-1".into(),
            kind: MarkDefKind::Link {
                href: "https://example.com".into(),
            },
        });
        assert!(block.mark_def("md-1").is_some());
        assert!(block.mark_def("md-2").is_none());
    }
}
