//! Content document aggregate and assembly from parsed sources.

use serde::{Deserialize, Serialize};

use crate::frontmatter::FrontMatter;
use crate::keys::KeyGen;
use crate::model::Block;
use crate::text::{
    EXCERPT_MAX, META_DESCRIPTION_MAX, META_TITLE_MAX, QUICK_ANSWER_MAX, truncate_at_word,
};

/// A content entry (e.g. a blog post): metadata plus the block tree.
///
/// The document id is derived from the source slug so that repeated imports
/// are idempotent upserts rather than duplicate creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub published_date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub quick_answer: String,
    #[serde(default)]
    pub voice_search_queries: Vec<String>,
    #[serde(default)]
    pub faqs: Vec<FaqEntry>,
    #[serde(default)]
    pub seo: Seo,
    #[serde(rename = "localSEO", default)]
    pub local_seo: LocalSeo,
    #[serde(default)]
    pub cta_settings: CtaSettings,
    #[serde(default)]
    pub content: Vec<Block>,
}

pub const DOC_TYPE_POST: &str = "post";

/// Stable document id for a source slug.
pub fn document_id(slug: &str) -> String {
    format!("post-{slug}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqEntry {
    #[serde(rename = "_key")]
    pub key: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub is_voice_optimized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSeo {
    pub target_location: String,
    pub nearby_landmarks: Vec<String>,
    pub local_search_modifiers: Vec<String>,
}

impl Default for LocalSeo {
    fn default() -> Self {
        Self {
            target_location: "United Kingdom".to_string(),
            nearby_landmarks: Vec::new(),
            local_search_modifiers: vec!["near me".to_string(), "local".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaSettings {
    pub primary_cta_text: String,
    pub template_message: String,
    pub urgency_level: Urgency,
}

impl Default for CtaSettings {
    fn default() -> Self {
        Self {
            primary_cta_text: "Book a free consultation".to_string(),
            template_message: "Hi, I'd like to talk about {topic} for my venue.".to_string(),
            urgency_level: Urgency::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    fn parse_or_default(s: &str) -> Self {
        match s {
            "high" => Urgency::High,
            "low" => Urgency::Low,
            _ => Urgency::Medium,
        }
    }
}

/// Assembles a write-ready [`Document`] from parsed frontmatter and blocks.
///
/// All length-limited fields pass through [`truncate_at_word`] here, so a
/// document that reaches the store always satisfies the field contracts.
pub fn assemble_document(
    slug: &str,
    front: &FrontMatter,
    content: Vec<Block>,
    keys: &mut KeyGen,
) -> Document {
    let faqs = front
        .faqs
        .iter()
        .map(|f| FaqEntry {
            key: keys.next("faq"),
            question: f.question.clone(),
            answer: f.answer.clone(),
            is_voice_optimized: f.is_voice_optimized,
        })
        .collect();

    let local_seo = front
        .local_seo
        .as_ref()
        .map(|l| {
            let defaults = LocalSeo::default();
            LocalSeo {
                target_location: if l.target_location.is_empty() {
                    defaults.target_location
                } else {
                    l.target_location.clone()
                },
                nearby_landmarks: l.nearby_landmarks.clone(),
                local_search_modifiers: if l.local_modifiers.is_empty() {
                    defaults.local_search_modifiers
                } else {
                    l.local_modifiers.clone()
                },
            }
        })
        .unwrap_or_default();

    let cta_settings = front
        .cta_settings
        .as_ref()
        .map(|c| {
            let defaults = CtaSettings::default();
            CtaSettings {
                primary_cta_text: if c.primary_text.is_empty() {
                    defaults.primary_cta_text
                } else {
                    c.primary_text.clone()
                },
                template_message: if c.template_message.is_empty() {
                    defaults.template_message
                } else {
                    c.template_message.clone()
                },
                urgency_level: Urgency::parse_or_default(&c.urgency),
            }
        })
        .unwrap_or_default();

    Document {
        id: document_id(slug),
        doc_type: DOC_TYPE_POST.to_string(),
        slug: slug.to_string(),
        title: front.title.clone(),
        excerpt: truncate_at_word(&front.excerpt, EXCERPT_MAX),
        published_date: front.published_date.clone(),
        category: front.category.clone(),
        tags: front.tags.clone(),
        quick_answer: truncate_at_word(&front.quick_answer, QUICK_ANSWER_MAX),
        voice_search_queries: front.voice_search_queries.clone(),
        faqs,
        seo: Seo {
            meta_title: truncate_at_word(front.seo_title(), META_TITLE_MAX),
            meta_description: truncate_at_word(front.seo_description(), META_DESCRIPTION_MAX),
            keywords: front.seo_keywords().to_vec(),
        },
        local_seo,
        cta_settings,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::FaqSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_id_is_derived_from_slug() {
        assert_eq!(document_id("pub-quiz-guide"), "post-pub-quiz-guide");
    }

    #[test]
    fn assembly_truncates_limited_fields() {
        let mut front = FrontMatter::default();
        front.title = "T".into();
        front.excerpt = "word ".repeat(60); // 300 chars
        front.quick_answer = "answer ".repeat(20); // 140 chars
        front.meta_title = "title ".repeat(20); // 120 chars
        front.meta_description = "desc ".repeat(50); // 250 chars

        let mut keys = KeyGen::deterministic();
        let doc = assemble_document("slug", &front, vec![], &mut keys);

        assert!(doc.excerpt.chars().count() <= 155);
        assert!(doc.quick_answer.chars().count() <= 75);
        assert!(doc.seo.meta_title.chars().count() <= 58);
        assert!(doc.seo.meta_description.chars().count() <= 155);
        assert!(!doc.excerpt.ends_with(' '));
    }

    #[test]
    fn faq_entries_get_keys() {
        let mut front = FrontMatter::default();
        front.faqs = vec![
            FaqSource {
                question: "Q1".into(),
                answer: "A1".into(),
                is_voice_optimized: true,
            },
            FaqSource {
                question: "Q2".into(),
                answer: "A2".into(),
                is_voice_optimized: false,
            },
        ];
        let mut keys = KeyGen::deterministic();
        let doc = assemble_document("slug", &front, vec![], &mut keys);
        assert_eq!(doc.faqs.len(), 2);
        assert_ne!(doc.faqs[0].key, doc.faqs[1].key);
        assert!(doc.faqs[0].is_voice_optimized);
    }

    #[test]
    fn local_seo_and_cta_default_when_absent() {
        let front = FrontMatter::default();
        let mut keys = KeyGen::deterministic();
        let doc = assemble_document("slug", &front, vec![], &mut keys);
        assert_eq!(doc.local_seo.target_location, "United Kingdom");
        assert_eq!(doc.cta_settings.urgency_level, Urgency::Medium);
        assert_eq!(
            doc.local_seo.local_search_modifiers,
            vec!["near me".to_string(), "local".to_string()]
        );
    }

    #[test]
    fn urgency_parses_known_levels() {
        assert_eq!(Urgency::parse_or_default("high"), Urgency::High);
        assert_eq!(Urgency::parse_or_default("low"), Urgency::Low);
        assert_eq!(Urgency::parse_or_default("whatever"), Urgency::Medium);
    }

    #[test]
    fn sparse_stored_documents_decode_with_defaults() {
        // Documents written by early importers carry only the core fields.
        let value = serde_json::json!({
            "_id": "post-legacy",
            "_type": "post",
            "slug": "legacy",
            "title": "Legacy Post",
        });
        let doc: Document = serde_json::from_value(value).unwrap();
        assert_eq!(doc.quick_answer, "");
        assert!(doc.tags.is_empty());
        assert!(doc.content.is_empty());
        assert_eq!(doc.local_seo.target_location, "United Kingdom");
        assert_eq!(doc.cta_settings.urgency_level, Urgency::Medium);
    }

    #[test]
    fn wire_shape_uses_cms_field_names() {
        let front = FrontMatter::default();
        let mut keys = KeyGen::deterministic();
        let doc = assemble_document("my-post", &front, vec![], &mut keys);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_id"], "post-my-post");
        assert_eq!(value["_type"], "post");
        assert!(value.get("publishedDate").is_some());
        assert!(value.get("ctaSettings").is_some());
        assert!(value.get("localSEO").is_some());
    }
}
