//! Block-tree serializers.
//!
//! Two targets: markdown (`markdown`, the structural inverse of the parser,
//! used for store-to-file export) and the alternate CMS's rich-text node
//! schema (`richtext`, used for cross-CMS migration).
//!
//! Both targets share the same failure contract: a single block that cannot
//! be converted degrades to a placeholder plus an entry in the accumulated
//! warning/error lists, and the overall conversion always completes with
//! partial output. Nothing in this module panics on malformed input.

pub mod markdown;
pub mod richtext;

pub use markdown::{MarkdownOptions, MarkdownOutput, to_markdown};
pub use richtext::{RichTextOutput, to_richtext};

use thiserror::Error;

/// Why a single block could not be serialized faithfully.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BlockError {
    #[error("heading level {0} out of range (expected 1..=6)")]
    HeadingLevelOutOfRange(u8),
    #[error("text-bearing block {0} has no children")]
    MissingChildren(String),
}

/// Non-fatal observations accumulated during a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A block kind the target cannot represent; a placeholder was emitted.
    UnsupportedBlock { key: String, kind: String },
    /// A span referenced a mark id with no matching mark definition; the
    /// text was kept, the mark dropped.
    DanglingMark { key: String, mark: String },
    /// A block failed to convert and was replaced by a placeholder.
    BlockFailed { key: String, error: BlockError },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnsupportedBlock { key, kind } => {
                write!(f, "block {key}: unsupported kind {kind}")
            }
            Warning::DanglingMark { key, mark } => {
                write!(f, "span {key}: dangling mark {mark}")
            }
            Warning::BlockFailed { key, error } => {
                write!(f, "block {key}: {error}")
            }
        }
    }
}

/// HTML-comment placeholder emitted in place of a block that could not be
/// converted. Comments survive markdown round-trips without rendering.
pub(crate) fn placeholder(detail: &str) -> String {
    format!("<!-- unsupported block: {detail} -->")
}
