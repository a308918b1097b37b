//! Markdown serializer: the structural inverse of the parser.

use super::{BlockError, Warning, placeholder};
use crate::model::{Block, BlockKind, ListKind, MarkDefKind, Span};
use crate::model::document::FaqEntry;

/// Serializer configuration covering the drift between the original export
/// scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownOptions {
    /// Write true sequential numbers for ordered items instead of the
    /// literal `1.` (renderers auto-number either way).
    pub renumber_ordered_lists: bool,
}

/// Result of a whole-document conversion. Always produced: per-block
/// failures become placeholders and entries in `errors`.
#[derive(Debug, Clone)]
pub struct MarkdownOutput {
    pub markdown: String,
    pub warnings: Vec<Warning>,
    pub errors: Vec<Warning>,
}

/// Serializes a block sequence (plus the document's FAQ entries, appended
/// under a fixed heading) to a single markdown string.
pub fn to_markdown(blocks: &[Block], faqs: &[FaqEntry], opts: MarkdownOptions) -> MarkdownOutput {
    let mut out = String::new();
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    let mut prev_was_list = false;
    let mut ordered_run = 0usize;

    for block in blocks {
        let is_list = matches!(block.kind, BlockKind::ListItem { .. });
        match block.kind {
            BlockKind::ListItem {
                list: ListKind::Ordered,
                ..
            } => ordered_run += 1,
            _ => ordered_run = 0,
        }

        let rendered = match render_block(block, opts, ordered_run, &mut warnings) {
            Ok(text) => text,
            Err(error) => {
                let text = placeholder(&error.to_string());
                errors.push(Warning::BlockFailed {
                    key: block.key.clone(),
                    error,
                });
                text
            }
        };

        if !out.is_empty() {
            // Consecutive list items stay on adjacent lines; everything
            // else gets a blank-line separator.
            out.push_str(if is_list && prev_was_list { "\n" } else { "\n\n" });
        }
        out.push_str(&rendered);
        prev_was_list = is_list;
    }

    append_faqs(&mut out, faqs);

    MarkdownOutput {
        markdown: out,
        warnings,
        errors,
    }
}

fn render_block(
    block: &Block,
    opts: MarkdownOptions,
    ordered_run: usize,
    warnings: &mut Vec<Warning>,
) -> Result<String, BlockError> {
    match &block.kind {
        BlockKind::Heading { level } => {
            if !(1..=6).contains(level) {
                return Err(BlockError::HeadingLevelOutOfRange(*level));
            }
            let text = render_children(block, warnings)?;
            Ok(format!("{} {}", "#".repeat(usize::from(*level)), text))
        }
        BlockKind::Paragraph => render_children(block, warnings),
        BlockKind::Blockquote => Ok(format!("> {}", render_children(block, warnings)?)),
        BlockKind::ListItem { list, level } => {
            let indent = "  ".repeat(usize::from(level.saturating_sub(1)));
            let marker = match list {
                ListKind::Unordered => "-".to_string(),
                ListKind::Ordered if opts.renumber_ordered_lists => {
                    format!("{}.", ordered_run.max(1))
                }
                ListKind::Ordered => "1.".to_string(),
            };
            Ok(format!(
                "{indent}{marker} {}",
                render_children(block, warnings)?
            ))
        }
        BlockKind::Image { src, alt, caption } => {
            let mut text = format!("![{alt}]({src})");
            if let Some(caption) = caption {
                text.push_str(&format!("\n\n*{caption}*"));
            }
            Ok(text)
        }
        BlockKind::Code { .. } => {
            warnings.push(Warning::UnsupportedBlock {
                key: block.key.clone(),
                kind: "code".to_string(),
            });
            Ok(placeholder("code"))
        }
        BlockKind::ComparisonTable { .. } => {
            warnings.push(Warning::UnsupportedBlock {
                key: block.key.clone(),
                kind: "comparisonTable".to_string(),
            });
            Ok(placeholder("comparisonTable"))
        }
    }
}

fn render_children(block: &Block, warnings: &mut Vec<Warning>) -> Result<String, BlockError> {
    if block.children.is_empty() {
        return Err(BlockError::MissingChildren(block.key.clone()));
    }
    Ok(block
        .children
        .iter()
        .map(|span| render_span(span, block, warnings))
        .collect())
}

fn render_span(span: &Span, block: &Block, warnings: &mut Vec<Warning>) -> String {
    let is_code = span.marks.iter().any(|m| m == "code");
    let mut text = if is_code {
        span.text.clone()
    } else {
        escape_plain(&span.text)
    };

    // Innermost-applied mark wraps first, so single-mark spans round-trip
    // stably through parse → serialize → parse.
    for mark in span.marks.iter().rev() {
        text = match mark.as_str() {
            "strong" => format!("**{text}**"),
            "em" => format!("*{text}*"),
            "code" => format!("`{text}`"),
            "underline" => format!("<u>{text}</u>"),
            "strike" => format!("~~{text}~~"),
            other => match block.mark_def(other) {
                Some(def) => match &def.kind {
                    MarkDefKind::Link { href } => format!("[{text}]({href})"),
                },
                None => {
                    warnings.push(Warning::DanglingMark {
                        key: span.key.clone(),
                        mark: other.to_string(),
                    });
                    text
                }
            },
        };
    }
    text
}

/// Escapes characters that would re-parse as structural markers. `*`, `_`
/// and parentheses are deliberately left alone: the first two are mark
/// delimiters handled above, the rest rarely cause trouble.
fn escape_plain(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '#' | '[' | ']' | '{' | '}') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn append_faqs(out: &mut String, faqs: &[FaqEntry]) {
    if faqs.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str("## Frequently Asked Questions");
    for faq in faqs {
        out.push_str(&format!("\n\n### {}\n\n{}", faq.question, faq.answer));
    }
}
