//! # Markdown parsing
//!
//! Two-phase, line-oriented parsing:
//!
//! 1. **Line classification** (`classify`): each line is classified
//!    independently into a [`LineClass`] using only local facts (heading
//!    marker, list marker and indent, blockquote prefix, fence, blank).
//! 2. **Block construction** (`builder`): [`BlockBuilder`] consumes the
//!    classified lines in order, tracking list-continuation and code-fence
//!    state, and emits keyed [`Block`]s with inline-parsed children.
//!
//! Inline mark parsing (`inline`) runs per block over the text left after
//! the structural marker is stripped.
//!
//! The historical migration scripts each carried their own slightly
//! different copy of this conversion; the drift between them is expressed
//! here as [`ParseOptions`] on a single parser.

pub mod builder;
pub mod classify;
pub mod inline;

pub use builder::BlockBuilder;
pub use classify::{LineClass, LineClassifier};
pub use inline::{InlineContent, parse_inline};

use crate::keys::KeyGen;
use crate::model::Block;

/// Parser configuration covering the variants found across the original
/// migration scripts.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Deepest `#` marker treated as a heading; longer runs fall back to
    /// paragraph text. The stricter scripts stopped at 4.
    pub max_heading_level: u8,
    /// Recognize ``` fenced code blocks (raw zones) as code blocks.
    pub detect_code_fences: bool,
    /// Recognize full-line `![alt](src)` as image blocks.
    pub detect_images: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_heading_level: 6,
            detect_code_fences: true,
            detect_images: true,
        }
    }
}

impl ParseOptions {
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    pub fn with_code_fences(mut self, detect: bool) -> Self {
        self.detect_code_fences = detect;
        self
    }

    pub fn with_images(mut self, detect: bool) -> Self {
        self.detect_images = detect;
        self
    }
}

/// Parses a markdown body (frontmatter already stripped) into blocks.
///
/// Empty input produces an empty sequence. Blank lines are separators only
/// and are never emitted as blocks.
pub fn parse_markdown(input: &str, opts: ParseOptions, keys: &mut KeyGen) -> Vec<Block> {
    let classifier = LineClassifier::new(opts);
    let mut builder = BlockBuilder::new(keys);

    for line in input.lines() {
        let class = classifier.classify(line);
        builder.push(line, class);
    }
    builder.finish()
}
