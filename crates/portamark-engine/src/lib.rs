pub mod batch;
pub mod frontmatter;
pub mod io;
pub mod keys;
pub mod model;
pub mod parse;
pub mod repair;
pub mod serialize;
pub mod store;
pub mod text;

// Re-export key types for easier usage
pub use batch::{BatchOptions, BatchSummary, ExportFormat, PipelineError, RepairSummary};
pub use frontmatter::{FrontMatter, SourceFile, parse_source};
pub use keys::KeyGen;
pub use model::document::{Document, assemble_document, document_id};
pub use model::{Block, BlockKind, ListKind, MarkDef, MarkDefKind, Span};
pub use parse::{ParseOptions, parse_markdown};
pub use repair::{RepairReport, repair_document};
pub use serialize::{MarkdownOptions, to_markdown, to_richtext};
pub use store::{ContentStore, JsonStore, MemoryStore, Patch, Query, StoreError};
pub use text::truncate_at_word;
