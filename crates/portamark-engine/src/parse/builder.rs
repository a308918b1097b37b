//! Block construction: phase 2 of block parsing.

use tracing::trace;

use super::classify::LineClass;
use super::inline::parse_inline;
use crate::keys::KeyGen;
use crate::model::{Block, BlockKind, ListKind};

/// State machine consuming classified lines and emitting keyed blocks.
///
/// Holds the two pieces of cross-line state the dialect needs: whether we
/// are inside a list run (reset by any blank or non-list line, never merging
/// or renumbering already-emitted blocks) and whether we are inside a code
/// fence (a raw zone that swallows lines verbatim until the closing fence).
pub struct BlockBuilder<'k> {
    keys: &'k mut KeyGen,
    in_list: Option<ListKind>,
    fence: Option<FenceState>,
    out: Vec<Block>,
}

struct FenceState {
    language: Option<String>,
    lines: Vec<String>,
}

impl<'k> BlockBuilder<'k> {
    pub fn new(keys: &'k mut KeyGen) -> Self {
        Self {
            keys,
            in_list: None,
            fence: None,
            out: Vec::new(),
        }
    }

    /// Consumes one line. `raw` is the original line (needed inside fences,
    /// where classification does not apply); `class` its classification.
    pub fn push(&mut self, raw: &str, class: LineClass) {
        if self.fence.is_some() {
            if matches!(class, LineClass::Fence { .. }) {
                if let Some(fence) = self.fence.take() {
                    self.emit_code(fence);
                }
            } else if let Some(fence) = &mut self.fence {
                fence.lines.push(raw.trim_end_matches('\r').to_string());
            }
            return;
        }

        match class {
            LineClass::Blank => self.leave_list(),
            LineClass::Fence { language } => {
                self.leave_list();
                self.fence = Some(FenceState {
                    language,
                    lines: Vec::new(),
                });
            }
            LineClass::Heading { level, text } => {
                self.leave_list();
                self.emit_text_block(BlockKind::Heading { level }, &text);
            }
            LineClass::ListItem { list, level, text } => {
                if self.in_list != Some(list) {
                    trace!(?list, "starting new list run");
                    self.in_list = Some(list);
                }
                self.emit_text_block(BlockKind::ListItem { list, level }, &text);
            }
            LineClass::Blockquote { text } => {
                self.leave_list();
                self.emit_text_block(BlockKind::Blockquote, &text);
            }
            LineClass::Image { alt, src } => {
                self.leave_list();
                let kind = BlockKind::Image {
                    src,
                    alt,
                    caption: None,
                };
                self.out.push(Block::new(kind, Vec::new(), self.keys));
            }
            LineClass::Paragraph { text } => {
                self.leave_list();
                self.emit_text_block(BlockKind::Paragraph, &text);
            }
        }
    }

    /// Flushes any unterminated fence and returns the blocks.
    pub fn finish(mut self) -> Vec<Block> {
        if let Some(fence) = self.fence.take() {
            // Unterminated fence: emit what we collected anyway.
            self.emit_code(fence);
        }
        self.out
    }

    fn leave_list(&mut self) {
        if self.in_list.take().is_some() {
            trace!("list run ended");
        }
    }

    fn emit_text_block(&mut self, kind: BlockKind, text: &str) {
        let content = parse_inline(text, self.keys);
        let mut block = Block::new(kind, content.spans, self.keys);
        block.mark_defs = content.mark_defs;
        self.out.push(block);
    }

    fn emit_code(&mut self, fence: FenceState) {
        let kind = BlockKind::Code {
            language: fence.language,
            code: fence.lines.join("\n"),
        };
        self.out.push(Block::new(kind, Vec::new(), self.keys));
    }
}
