//! CMS wire shape for blocks.
//!
//! The document store represents rich text the portable-text way: text
//! blocks are `{"_type": "block", "style": "h2" | "normal" | "blockquote",
//! "listItem": …, "children": […], "markDefs": […]}` and non-text kinds are
//! separate `_type`s. [`WireBlock`] is the serde-derived mirror of that
//! shape; the typed [`Block`] converts through it via `try_from`/`into`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Block, BlockKind, ListKind, MarkDef, Span, TableRow};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("unknown block style: {0}")]
    UnknownStyle(String),
    #[error("unknown listItem kind: {0}")]
    UnknownListKind(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "camelCase")]
pub enum WireBlock {
    Block {
        #[serde(rename = "_key")]
        key: String,
        #[serde(default = "default_style")]
        style: String,
        #[serde(rename = "listItem", skip_serializing_if = "Option::is_none")]
        list_item: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        level: Option<u8>,
        #[serde(rename = "markDefs", default)]
        mark_defs: Vec<MarkDef>,
        #[serde(default)]
        children: Vec<Span>,
    },
    Image {
        #[serde(rename = "_key")]
        key: String,
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Code {
        #[serde(rename = "_key")]
        key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        code: String,
    },
    ComparisonTable {
        #[serde(rename = "_key")]
        key: String,
        #[serde(default)]
        rows: Vec<TableRow>,
    },
}

fn default_style() -> String {
    "normal".to_string()
}

impl From<Block> for WireBlock {
    fn from(b: Block) -> Self {
        match b.kind {
            BlockKind::Heading { level } => WireBlock::Block {
                key: b.key,
                style: format!("h{level}"),
                list_item: None,
                level: None,
                mark_defs: b.mark_defs,
                children: b.children,
            },
            BlockKind::Paragraph => WireBlock::Block {
                key: b.key,
                style: default_style(),
                list_item: None,
                level: None,
                mark_defs: b.mark_defs,
                children: b.children,
            },
            BlockKind::Blockquote => WireBlock::Block {
                key: b.key,
                style: "blockquote".to_string(),
                list_item: None,
                level: None,
                mark_defs: b.mark_defs,
                children: b.children,
            },
            BlockKind::ListItem { list, level } => WireBlock::Block {
                key: b.key,
                style: default_style(),
                list_item: Some(
                    match list {
                        ListKind::Unordered => "bullet",
                        ListKind::Ordered => "number",
                    }
                    .to_string(),
                ),
                level: Some(level),
                mark_defs: b.mark_defs,
                children: b.children,
            },
            BlockKind::Image { src, alt, caption } => WireBlock::Image {
                key: b.key,
                src,
                alt,
                caption,
            },
            BlockKind::Code { language, code } => WireBlock::Code {
                key: b.key,
                language,
                code,
            },
            BlockKind::ComparisonTable { rows } => WireBlock::ComparisonTable { key: b.key, rows },
        }
    }
}

impl TryFrom<WireBlock> for Block {
    type Error = WireError;

    fn try_from(w: WireBlock) -> Result<Self, Self::Error> {
        Ok(match w {
            WireBlock::Block {
                key,
                style,
                list_item,
                level,
                mark_defs,
                children,
            } => {
                let kind = match list_item {
                    Some(li) => BlockKind::ListItem {
                        list: parse_list_kind(&li)?,
                        level: level.unwrap_or(1),
                    },
                    None => parse_style(&style)?,
                };
                Block {
                    key,
                    kind,
                    children,
                    mark_defs,
                }
            }
            WireBlock::Image {
                key,
                src,
                alt,
                caption,
            } => Block {
                key,
                kind: BlockKind::Image { src, alt, caption },
                children: Vec::new(),
                mark_defs: Vec::new(),
            },
            WireBlock::Code {
                key,
                language,
                code,
            } => Block {
                key,
                kind: BlockKind::Code { language, code },
                children: Vec::new(),
                mark_defs: Vec::new(),
            },
            WireBlock::ComparisonTable { key, rows } => Block {
                key,
                kind: BlockKind::ComparisonTable { rows },
                children: Vec::new(),
                mark_defs: Vec::new(),
            },
        })
    }
}

fn parse_style(style: &str) -> Result<BlockKind, WireError> {
    match style {
        "normal" => Ok(BlockKind::Paragraph),
        "blockquote" => Ok(BlockKind::Blockquote),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Ok(BlockKind::Heading {
            // Safe: matched literal is always 'h' + one ascii digit
            level: style.as_bytes()[1] - b'0',
        }),
        other => Err(WireError::UnknownStyle(other.to_string())),
    }
}

fn parse_list_kind(list_item: &str) -> Result<ListKind, WireError> {
    match list_item {
        "bullet" => Ok(ListKind::Unordered),
        "number" => Ok(ListKind::Ordered),
        other => Err(WireError::UnknownListKind(other.to_string())),
    }
}
