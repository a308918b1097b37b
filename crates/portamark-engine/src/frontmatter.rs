//! YAML frontmatter handling for markdown source files.
//!
//! Source documents are UTF-8 markdown files with a `---`-delimited YAML
//! header. The header carries the CMS metadata fields; the remainder of the
//! file is the markdown body fed to the block parser. Files without a
//! header parse as an empty [`FrontMatter`] plus the whole text as body.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("unterminated frontmatter block (missing closing ---)")]
    Unterminated,
    #[error("invalid frontmatter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Metadata fields read from a source file's YAML header.
///
/// Every key is optional in the file; missing keys default to empty
/// string/list. SEO fields accept both the nested `seo:` shape and the
/// legacy flat `metaTitle`/`metaDescription`/`keywords` keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrontMatter {
    pub title: String,
    pub excerpt: String,
    pub published_date: String,
    pub category: String,
    pub tags: Vec<String>,
    pub quick_answer: String,
    pub voice_search_queries: Vec<String>,
    pub faqs: Vec<FaqSource>,
    pub seo: Option<SeoSource>,
    // Legacy flat SEO keys, superseded by the nested `seo` mapping.
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    #[serde(alias = "localSEO")]
    pub local_seo: Option<LocalSeoSource>,
    pub cta_settings: Option<CtaSource>,
}

impl FrontMatter {
    /// Resolved SEO title: nested `seo.title` wins over legacy `metaTitle`.
    pub fn seo_title(&self) -> &str {
        match &self.seo {
            Some(seo) if !seo.title.is_empty() => &seo.title,
            _ => &self.meta_title,
        }
    }

    pub fn seo_description(&self) -> &str {
        match &self.seo {
            Some(seo) if !seo.description.is_empty() => &seo.description,
            _ => &self.meta_description,
        }
    }

    pub fn seo_keywords(&self) -> &[String] {
        match &self.seo {
            Some(seo) if !seo.keywords.is_empty() => &seo.keywords,
            _ => &self.keywords,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeoSource {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqSource {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub is_voice_optimized: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalSeoSource {
    pub target_location: String,
    pub nearby_landmarks: Vec<String>,
    pub local_modifiers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaSource {
    pub primary_text: String,
    pub template_message: String,
    pub urgency: String,
}

/// A source file split into parsed frontmatter and markdown body.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub front: FrontMatter,
    pub body: String,
}

/// Splits and parses a markdown source file.
pub fn parse_source(input: &str) -> Result<SourceFile, FrontmatterError> {
    let (raw_front, body) = split_frontmatter(input)?;
    let front = match raw_front {
        Some(yaml) => serde_yaml::from_str(yaml)?,
        None => FrontMatter::default(),
    };
    Ok(SourceFile {
        front,
        body: body.to_string(),
    })
}

/// Splits the raw YAML header (if any) from the markdown body.
///
/// The opening `---` must be the very first line. A file that opens a
/// header and never closes it is an error rather than a silent
/// whole-file-as-body fallback.
pub fn split_frontmatter(input: &str) -> Result<(Option<&str>, &str), FrontmatterError> {
    let Some(rest) = input
        .strip_prefix("---\n")
        .or_else(|| input.strip_prefix("---\r\n"))
    else {
        return Ok((None, input));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Ok((Some(&rest[..start]), &rest[offset..]));
        }
    }
    Err(FrontmatterError::Unterminated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "---\n\
title: How to Run a Pub Quiz\n\
excerpt: A short guide\n\
publishedDate: \"2024-03-01\"\n\
category: events\n\
tags:\n  - quiz\n  - midweek\n\
quickAnswer: Book a quizmaster and promote two weeks ahead.\n\
voiceSearchQueries:\n  - how do I run a pub quiz\n\
faqs:\n  - question: How long should it run?\n    answer: About two hours.\n    isVoiceOptimized: true\n\
seo:\n  title: Pub Quiz Guide\n  description: Run a profitable quiz night\n  keywords:\n    - pub quiz\n\
---\n\
## First Steps\n\nPick a weeknight.\n";

    #[test]
    fn parses_full_frontmatter() {
        let source = parse_source(SAMPLE).unwrap();
        assert_eq!(source.front.title, "How to Run a Pub Quiz");
        assert_eq!(source.front.tags, vec!["quiz", "midweek"]);
        assert_eq!(source.front.faqs.len(), 1);
        assert!(source.front.faqs[0].is_voice_optimized);
        assert_eq!(source.front.seo_title(), "Pub Quiz Guide");
        assert_eq!(source.body, "## First Steps\n\nPick a weeknight.\n");
    }

    #[test]
    fn legacy_flat_seo_keys_are_honoured() {
        let input = "---\ntitle: T\nmetaTitle: Legacy Title\nmetaDescription: Legacy Desc\nkeywords:\n  - legacy\n---\nbody\n";
        let source = parse_source(input).unwrap();
        assert_eq!(source.front.seo_title(), "Legacy Title");
        assert_eq!(source.front.seo_description(), "Legacy Desc");
        assert_eq!(source.front.seo_keywords(), ["legacy".to_string()]);
    }

    #[test]
    fn nested_seo_wins_over_legacy() {
        let input =
            "---\nmetaTitle: Legacy\nseo:\n  title: Nested\n---\n";
        let source = parse_source(input).unwrap();
        assert_eq!(source.front.seo_title(), "Nested");
    }

    #[test]
    fn file_without_frontmatter_is_all_body() {
        let source = parse_source("# Just a Heading\n").unwrap();
        assert_eq!(source.front.title, "");
        assert_eq!(source.body, "# Just a Heading\n");
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let source = parse_source("---\ntitle: Only Title\n---\nbody").unwrap();
        assert_eq!(source.front.excerpt, "");
        assert!(source.front.tags.is_empty());
        assert!(source.front.faqs.is_empty());
        assert!(source.front.seo.is_none());
    }

    #[test]
    fn unterminated_frontmatter_is_an_error() {
        let err = parse_source("---\ntitle: Broken\n").unwrap_err();
        assert!(matches!(err, FrontmatterError::Unterminated));
    }

    #[test]
    fn closing_delimiter_at_end_of_file_without_newline() {
        let source = parse_source("---\ntitle: T\n---").unwrap();
        assert_eq!(source.front.title, "T");
        assert_eq!(source.body, "");
    }
}
