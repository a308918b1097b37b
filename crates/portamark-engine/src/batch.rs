//! Batch drivers: import, export, repair.
//!
//! Single-threaded, one document at a time. A failure on one document is
//! logged and tallied, never fatal to the rest of the batch; only setup
//! problems (missing source directory, unreachable store) abort a run
//! before any document is processed. Writes are spaced out by a politeness
//! throttle so a remote store is not hammered; it is a courtesy, not a
//! correctness requirement.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::frontmatter::parse_source;
use crate::io::{self, IoError};
use crate::keys::KeyGen;
use crate::model::document::{DOC_TYPE_POST, Document, assemble_document};
use crate::parse::{ParseOptions, parse_markdown};
use crate::repair::repair_document;
use crate::serialize::{MarkdownOptions, to_markdown, to_richtext};
use crate::store::{ContentStore, Patch, Query, StoreError};

/// Setup failures that abort a batch before it starts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to create output directory {0}")]
    OutputDir(std::path::PathBuf, #[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub parse: ParseOptions,
    pub markdown: MarkdownOptions,
    /// Delay between consecutive store writes.
    pub throttle: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            markdown: MarkdownOptions::default(),
            throttle: Duration::from_millis(250),
        }
    }
}

/// One failed document in a batch.
#[derive(Debug, Clone)]
pub struct DocFailure {
    pub slug: String,
    pub error: String,
}

/// End-of-run tally. Batches report counts, not a single pass/fail.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub warnings: usize,
    pub failures: Vec<DocFailure>,
}

impl BatchSummary {
    fn success(&mut self, warnings: usize) {
        self.succeeded += 1;
        self.warnings += warnings;
    }

    fn failure(&mut self, slug: &str, error: &anyhow::Error) {
        warn!(slug, error = %format!("{error:#}"), "document failed");
        self.failed += 1;
        self.failures.push(DocFailure {
            slug: slug.to_string(),
            error: format!("{error:#}"),
        });
    }
}

/// Totals from a repair run, alongside the per-document tally.
#[derive(Debug, Clone, Default)]
pub struct RepairSummary {
    pub batch: BatchSummary,
    pub documents_changed: usize,
    pub keys_added: usize,
    pub null_mark_defs_removed: usize,
}

/// Export target representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    RichText,
}

/// Imports every markdown file under `content_root` into the store as an
/// idempotent upsert keyed by the slug-derived document id.
pub fn import_directory(
    store: &mut dyn ContentStore,
    content_root: &Path,
    opts: &BatchOptions,
) -> Result<BatchSummary, PipelineError> {
    let files = io::scan_markdown_files(content_root)?;
    info!(count = files.len(), dir = %content_root.display(), "importing markdown sources");

    let mut summary = BatchSummary::default();
    for (index, path) in files.iter().enumerate() {
        if index > 0 {
            thread::sleep(opts.throttle);
        }
        let slug = io::slug_for(path);
        info!(slug, file = %path.display(), "importing");
        match import_one(store, path, &slug, opts) {
            Ok(()) => summary.success(0),
            Err(error) => summary.failure(&slug, &error),
        }
    }
    Ok(summary)
}

fn import_one(
    store: &mut dyn ContentStore,
    path: &Path,
    slug: &str,
    opts: &BatchOptions,
) -> anyhow::Result<()> {
    let raw = io::read_file(path).with_context(|| format!("reading {}", path.display()))?;
    let source = parse_source(&raw).context("parsing frontmatter")?;

    let mut keys = KeyGen::new();
    let blocks = parse_markdown(&source.body, opts.parse, &mut keys);
    let doc = assemble_document(slug, &source.front, blocks, &mut keys);

    let payload = serde_json::to_value(&doc).context("serializing document")?;
    store
        .create_or_replace(payload)
        .context("writing to store")?;
    Ok(())
}

/// Exports every post in the store to one file per document under
/// `out_dir`, in the requested representation.
pub fn export_documents(
    store: &mut dyn ContentStore,
    out_dir: &Path,
    format: ExportFormat,
    opts: &BatchOptions,
) -> Result<BatchSummary, PipelineError> {
    let docs = store.query(&Query::of_type(DOC_TYPE_POST))?;
    fs::create_dir_all(out_dir)
        .map_err(|e| PipelineError::OutputDir(out_dir.to_path_buf(), e))?;
    info!(count = docs.len(), dir = %out_dir.display(), "exporting documents");

    let mut summary = BatchSummary::default();
    for value in docs {
        let slug = value
            .get("slug")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        info!(slug, "exporting");
        match export_one(&value, &slug, out_dir, format, opts) {
            Ok(warnings) => summary.success(warnings),
            Err(error) => summary.failure(&slug, &error),
        }
    }
    Ok(summary)
}

fn export_one(
    value: &Value,
    slug: &str,
    out_dir: &Path,
    format: ExportFormat,
    opts: &BatchOptions,
) -> anyhow::Result<usize> {
    let doc: Document =
        serde_json::from_value(value.clone()).context("decoding stored document")?;

    match format {
        ExportFormat::Markdown => {
            let out = to_markdown(&doc.content, &doc.faqs, opts.markdown);
            for warning in &out.warnings {
                warn!(slug, %warning, "markdown export warning");
            }
            let header = frontmatter_header(&doc)?;
            let contents = format!("{header}{}\n", out.markdown);
            fs::write(out_dir.join(format!("{slug}.md")), contents)?;
            Ok(out.warnings.len() + out.errors.len())
        }
        ExportFormat::RichText => {
            let out = to_richtext(&doc.content);
            for warning in &out.warnings {
                warn!(slug, %warning, "rich-text export warning");
            }
            let pretty = serde_json::to_string_pretty(&out.doc)?;
            fs::write(out_dir.join(format!("{slug}.json")), pretty + "\n")?;
            Ok(out.warnings.len() + out.errors.len())
        }
    }
}

fn frontmatter_header(doc: &Document) -> anyhow::Result<String> {
    let meta = serde_json::json!({
        "title": doc.title,
        "excerpt": doc.excerpt,
        "publishedDate": doc.published_date,
        "category": doc.category,
        "tags": doc.tags,
        "quickAnswer": doc.quick_answer,
        "voiceSearchQueries": doc.voice_search_queries,
        "seo": {
            "title": doc.seo.meta_title,
            "description": doc.seo.meta_description,
            "keywords": doc.seo.keywords,
        },
    });
    let yaml = serde_yaml::to_string(&meta).context("serializing frontmatter")?;
    Ok(format!("---\n{yaml}---\n\n"))
}

/// Runs the key/markDefs repair pass over every post in the store,
/// patching back only the top-level fields the pass actually changed.
pub fn repair_documents(
    store: &mut dyn ContentStore,
    opts: &BatchOptions,
    dry_run: bool,
) -> Result<RepairSummary, PipelineError> {
    let docs = store.query(&Query::of_type(DOC_TYPE_POST))?;
    info!(count = docs.len(), dry_run, "repairing documents");

    let mut summary = RepairSummary::default();
    let mut writes = 0usize;
    for original in docs {
        let slug = original
            .get("slug")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        let mut repaired = original.clone();
        let report = repair_document(&mut repaired);
        summary.keys_added += report.keys_added;
        summary.null_mark_defs_removed += report.null_mark_defs_removed;

        if !report.changed {
            summary.batch.success(0);
            continue;
        }
        summary.documents_changed += 1;
        info!(
            slug,
            keys_added = report.keys_added,
            null_mark_defs_removed = report.null_mark_defs_removed,
            "document needed repair"
        );
        if dry_run {
            summary.batch.success(0);
            continue;
        }

        if writes > 0 {
            thread::sleep(opts.throttle);
        }
        match patch_changed_fields(store, &original, repaired) {
            Ok(()) => {
                writes += 1;
                summary.batch.success(0);
            }
            Err(error) => summary.batch.failure(&slug, &error),
        }
    }
    Ok(summary)
}

/// Patches only the top-level fields that differ between the original and
/// repaired wire forms. Read-modify-write with no revision check: batch
/// runs are human-supervised and infrequent, so the lost-update window is
/// accepted rather than papered over with locking the store never had.
fn patch_changed_fields(
    store: &mut dyn ContentStore,
    original: &Value,
    repaired: Value,
) -> anyhow::Result<()> {
    let id = original
        .get("_id")
        .and_then(Value::as_str)
        .context("repaired document has no _id")?;
    let (Value::Object(before), Value::Object(after)) = (original, &repaired) else {
        anyhow::bail!("document is not an object");
    };

    let mut patch = Patch::new(id);
    let mut any = false;
    for (field, value) in after {
        if before.get(field) != Some(value) {
            patch = patch.set(field.as_str(), value.clone());
            any = true;
        }
    }
    if any {
        patch.commit(store).context("patching document")?;
    }
    Ok(())
}

/// Parses every source file and reports conversion warnings without
/// touching any store. This is the preflight used before a real import.
pub fn check_directory(
    content_root: &Path,
    opts: &BatchOptions,
) -> Result<BatchSummary, PipelineError> {
    let files = io::scan_markdown_files(content_root)?;
    info!(count = files.len(), "checking markdown sources");

    let mut summary = BatchSummary::default();
    for path in &files {
        let slug = io::slug_for(path);
        match check_one(path, opts) {
            Ok(warnings) => summary.success(warnings),
            Err(error) => summary.failure(&slug, &error),
        }
    }
    Ok(summary)
}

fn check_one(path: &Path, opts: &BatchOptions) -> anyhow::Result<usize> {
    let raw = io::read_file(path)?;
    let source = parse_source(&raw).context("parsing frontmatter")?;
    let mut keys = KeyGen::new();
    let blocks = parse_markdown(&source.body, opts.parse, &mut keys);
    let out = to_markdown(&blocks, &[], opts.markdown);
    Ok(out.warnings.len() + out.errors.len())
}
