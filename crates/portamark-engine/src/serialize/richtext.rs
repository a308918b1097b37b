//! Rich-text serializer for the migration target CMS.
//!
//! The target schema is a single `{"type": "doc", "content": [...]}` node
//! tree: headings and paragraphs hold `text` leaves with `marks`,
//! consecutive list-item blocks coalesce into one `bullet_list` /
//! `ordered_list` node wrapping `list_item` → `paragraph` chains. Built as
//! `serde_json` values because the schema is foreign and only travels
//! outward.

use serde_json::{Value, json};

use super::{BlockError, Warning, placeholder};
use crate::model::{Block, BlockKind, ListKind, MarkDefKind, Span};

/// Result of a whole-document conversion into the rich-text schema.
#[derive(Debug, Clone)]
pub struct RichTextOutput {
    pub doc: Value,
    pub warnings: Vec<Warning>,
    pub errors: Vec<Warning>,
}

/// Converts a block sequence into the target rich-text document node.
///
/// Same failure contract as the markdown target: a block that cannot be
/// converted becomes a placeholder paragraph plus an accumulated entry, and
/// the conversion always completes.
pub fn to_richtext(blocks: &[Block]) -> RichTextOutput {
    let mut content: Vec<Value> = Vec::new();
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    // Open list run: (kind, pending list_item nodes)
    let mut list_run: Option<(ListKind, Vec<Value>)> = None;

    for block in blocks {
        if let BlockKind::ListItem { list, .. } = block.kind {
            let item = match list_item_node(block, &mut warnings) {
                Ok(node) => node,
                Err(error) => {
                    errors.push(Warning::BlockFailed {
                        key: block.key.clone(),
                        error,
                    });
                    placeholder_node(&block.key)
                }
            };
            match &mut list_run {
                Some((kind, items)) if *kind == list => items.push(item),
                _ => {
                    flush_list(&mut content, list_run.take());
                    list_run = Some((list, vec![item]));
                }
            }
            continue;
        }
        flush_list(&mut content, list_run.take());

        match block_node(block, &mut warnings) {
            Ok(node) => content.push(node),
            Err(error) => {
                errors.push(Warning::BlockFailed {
                    key: block.key.clone(),
                    error,
                });
                content.push(placeholder_node(&block.key));
            }
        }
    }
    flush_list(&mut content, list_run.take());

    RichTextOutput {
        doc: json!({ "type": "doc", "content": content }),
        warnings,
        errors,
    }
}

fn flush_list(content: &mut Vec<Value>, run: Option<(ListKind, Vec<Value>)>) {
    if let Some((kind, items)) = run {
        let node_type = match kind {
            ListKind::Unordered => "bullet_list",
            ListKind::Ordered => "ordered_list",
        };
        content.push(json!({ "type": node_type, "content": items }));
    }
}

fn list_item_node(block: &Block, warnings: &mut Vec<Warning>) -> Result<Value, BlockError> {
    let leaves = text_leaves(block, warnings)?;
    Ok(json!({
        "type": "list_item",
        "content": [{ "type": "paragraph", "content": leaves }],
    }))
}

fn block_node(block: &Block, warnings: &mut Vec<Warning>) -> Result<Value, BlockError> {
    match &block.kind {
        BlockKind::Heading { level } => {
            if !(1..=6).contains(level) {
                return Err(BlockError::HeadingLevelOutOfRange(*level));
            }
            Ok(json!({
                "type": "heading",
                "attrs": { "level": level },
                "content": text_leaves(block, warnings)?,
            }))
        }
        BlockKind::Paragraph => Ok(json!({
            "type": "paragraph",
            "content": text_leaves(block, warnings)?,
        })),
        BlockKind::Blockquote => Ok(json!({
            "type": "blockquote",
            "content": [{ "type": "paragraph", "content": text_leaves(block, warnings)? }],
        })),
        BlockKind::Image { src, alt, caption } => Ok(json!({
            "type": "image",
            "attrs": { "src": src, "alt": alt, "title": caption },
        })),
        BlockKind::Code { language, code } => {
            let class = language.as_ref().map(|l| format!("language-{l}"));
            Ok(json!({
                "type": "code_block",
                "attrs": { "class": class },
                "content": [{ "type": "text", "text": code }],
            }))
        }
        BlockKind::ComparisonTable { .. } => {
            warnings.push(Warning::UnsupportedBlock {
                key: block.key.clone(),
                kind: "comparisonTable".to_string(),
            });
            Ok(placeholder_node(&block.key))
        }
        BlockKind::ListItem { .. } => unreachable!("list items handled by the run coalescer"),
    }
}

fn text_leaves(block: &Block, warnings: &mut Vec<Warning>) -> Result<Vec<Value>, BlockError> {
    if block.children.is_empty() {
        return Err(BlockError::MissingChildren(block.key.clone()));
    }
    Ok(block
        .children
        .iter()
        .map(|span| text_leaf(span, block, warnings))
        .collect())
}

fn text_leaf(span: &Span, block: &Block, warnings: &mut Vec<Warning>) -> Value {
    let mut marks: Vec<Value> = Vec::new();
    for mark in &span.marks {
        match mark.as_str() {
            "strong" => marks.push(json!({ "type": "bold" })),
            "em" => marks.push(json!({ "type": "italic" })),
            "code" => marks.push(json!({ "type": "code" })),
            "underline" => marks.push(json!({ "type": "underline" })),
            "strike" => marks.push(json!({ "type": "strike" })),
            other => match block.mark_def(other) {
                Some(def) => match &def.kind {
                    MarkDefKind::Link { href } => marks.push(json!({
                        "type": "link",
                        "attrs": { "href": href },
                    })),
                },
                None => warnings.push(Warning::DanglingMark {
                    key: span.key.clone(),
                    mark: other.to_string(),
                }),
            },
        }
    }
    if marks.is_empty() {
        json!({ "type": "text", "text": span.text })
    } else {
        json!({ "type": "text", "text": span.text, "marks": marks })
    }
}

fn placeholder_node(key: &str) -> Value {
    json!({
        "type": "paragraph",
        "content": [{ "type": "text", "text": placeholder(key) }],
    })
}
