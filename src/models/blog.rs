//! Blog article model.

use serde::{Deserialize, Serialize};

use super::record::{unsupported_action, Entity, FieldValue, RecordMeta, StatusAction, Transition};
use crate::errors::AppError;

/// Words read per minute when estimating reading time.
const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

/// A blog article, keyed by slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogArticle {
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Zero means "estimate from content".
    #[serde(default)]
    pub reading_minutes: u32,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl BlogArticle {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            excerpt: String::new(),
            content: String::new(),
            category: String::new(),
            author: String::new(),
            tags: Vec::new(),
            cover_image: None,
            reading_minutes: 0,
            status: ArticleStatus::Draft,
            meta: RecordMeta::default(),
        }
    }

    pub fn reading_time(&self) -> usize {
        if self.reading_minutes > 0 {
            return self.reading_minutes as usize;
        }
        let words = self.content.split_whitespace().count();
        words.div_ceil(WORDS_PER_MINUTE)
    }
}

impl Entity for BlogArticle {
    const KIND: &'static str = "blog article";
    const STORAGE_KEY: &'static str = "donorops.blog_articles";
    const FACETS: &'static [&'static str] = &["status", "category", "author"];
    const CSV_COLUMNS: &'static [&'static str] = &[
        "slug",
        "title",
        "category",
        "author",
        "tags",
        "status",
        "readingMinutes",
        "publishedAt",
        "updatedAt",
    ];
    const EXPORTABLE_COLUMNS: &'static [&'static str] = &[
        "slug",
        "title",
        "excerpt",
        "category",
        "author",
        "coverImage",
        "readingMinutes",
    ];

    fn key(&self) -> &str {
        &self.slug
    }

    fn assign_key(&mut self) {
        if self.slug.trim().is_empty() {
            self.slug = slug::slugify(&self.title);
        }
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.excerpt.as_str()]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.as_str().to_string()),
            "category" => Some(self.category.clone()),
            "author" => Some(self.author.clone()),
            _ => None,
        }
    }

    fn length(&self) -> usize {
        self.reading_time()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "slug" => Some(FieldValue::from(&self.slug)),
            "title" => Some(FieldValue::from(&self.title)),
            "excerpt" => Some(FieldValue::from(&self.excerpt)),
            "category" => Some(FieldValue::from(&self.category)),
            "author" => Some(FieldValue::from(&self.author)),
            "coverImage" => Some(FieldValue::Text(
                self.cover_image.clone().unwrap_or_default(),
            )),
            "readingMinutes" => Some(FieldValue::Integer(self.reading_time() as i64)),
            _ => None,
        }
    }

    fn transition(&mut self, action: StatusAction, now: &str) -> Result<Transition, AppError> {
        match action {
            StatusAction::Publish => {
                if self.status == ArticleStatus::Published && self.meta.is_published() {
                    return Ok(Transition::Unchanged);
                }
                self.status = ArticleStatus::Published;
                self.meta.published_at = now.to_string();
                Ok(Transition::Applied)
            }
            StatusAction::Unpublish => {
                if self.status == ArticleStatus::Draft && self.meta.published_at.is_empty() {
                    return Ok(Transition::Unchanged);
                }
                self.status = ArticleStatus::Draft;
                self.meta.published_at.clear();
                Ok(Transition::Applied)
            }
            other => Err(unsupported_action(Self::KIND, other)),
        }
    }

    fn validate_fields(&self) -> Result<(), AppError> {
        if self.slug != self.slug.trim() || self.slug.contains(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "Slug '{}' must not contain whitespace",
                self.slug
            )));
        }
        match (self.status, self.meta.is_published()) {
            (ArticleStatus::Published, false) => Err(AppError::Validation(format!(
                "Published article '{}' needs a publishedAt date",
                self.slug
            ))),
            (ArticleStatus::Draft, true) => Err(AppError::Validation(format!(
                "Draft article '{}' must not carry a publishedAt date",
                self.slug
            ))),
            _ => Ok(()),
        }
    }

    fn seed() -> Vec<Self> {
        vec![
            seed_article(
                "rapport-annuel-2024",
                "Rapport annuel 2024 : une année sur le terrain",
                "Chiffres clés, projets livrés et leçons apprises.",
                "transparence",
                &["rapport", "transparence"],
                7,
                "2025-03-01T09:00:00Z",
            ),
            seed_article(
                "puits-solaires-sahel",
                "Des puits solaires pour trois villages du Sahel",
                "Retour sur le chantier d'accès à l'eau mené avec nos partenaires locaux.",
                "projets",
                &["eau", "energie", "sahel"],
                5,
                "2025-02-01T09:00:00Z",
            ),
            seed_article(
                "formation-benevoles",
                "Former les bénévoles à la gestion de projet",
                "Le nouveau parcours e-learning ouvert à toute l'équipe.",
                "e-learning",
                &["formation", "benevolat"],
                4,
                "2025-01-01T09:00:00Z",
            ),
        ]
    }
}

fn seed_article(
    slug: &str,
    title: &str,
    excerpt: &str,
    category: &str,
    tags: &[&str],
    reading_minutes: u32,
    published_at: &str,
) -> BlogArticle {
    BlogArticle {
        excerpt: excerpt.to_string(),
        category: category.to_string(),
        author: "Équipe communication".to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        reading_minutes,
        status: ArticleStatus::Published,
        meta: RecordMeta::new(published_at, published_at),
        ..BlogArticle::new(slug, title)
    }
}
