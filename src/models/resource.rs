//! Resource library model (reports, guides, toolkits).

use serde::{Deserialize, Serialize};

use super::record::{unsupported_action, Entity, FieldValue, RecordMeta, StatusAction, Transition};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    #[default]
    Draft,
    Published,
    Retired,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Draft => "draft",
            ResourceStatus::Published => "published",
            ResourceStatus::Retired => "retired",
        }
    }
}

/// Who may download a resource from the public site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Members,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Members => "members",
        }
    }
}

/// A downloadable document in the resource library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: String,
    /// report, guide, toolkit, video...
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Resource {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            category: String::new(),
            resource_type: String::new(),
            visibility: Visibility::Public,
            tags: Vec::new(),
            file_url: None,
            pages: 0,
            status: ResourceStatus::Draft,
            meta: RecordMeta::default(),
        }
    }
}

impl Entity for Resource {
    const KIND: &'static str = "resource";
    const STORAGE_KEY: &'static str = "donorops.resources";
    const FACETS: &'static [&'static str] = &["status", "category", "resourceType", "visibility"];
    const CSV_COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "category",
        "resourceType",
        "visibility",
        "tags",
        "pages",
        "status",
        "publishedAt",
        "updatedAt",
    ];
    const EXPORTABLE_COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "summary",
        "category",
        "resourceType",
        "visibility",
        "fileUrl",
        "pages",
    ];

    fn key(&self) -> &str {
        &self.id
    }

    fn assign_key(&mut self) {
        if self.id.trim().is_empty() {
            self.id = uuid::Uuid::new_v4().to_string();
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
        vec![self.title.as_str(), self.summary.as_str()]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.as_str().to_string()),
            "category" => Some(self.category.clone()),
            "resourceType" => Some(self.resource_type.clone()),
            "visibility" => Some(self.visibility.as_str().to_string()),
            _ => None,
        }
    }

    fn length(&self) -> usize {
        self.pages as usize
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::from(&self.id)),
            "title" => Some(FieldValue::from(&self.title)),
            "summary" => Some(FieldValue::from(&self.summary)),
            "category" => Some(FieldValue::from(&self.category)),
            "resourceType" => Some(FieldValue::from(&self.resource_type)),
            "visibility" => Some(FieldValue::from(self.visibility.as_str())),
            "fileUrl" => Some(FieldValue::Text(self.file_url.clone().unwrap_or_default())),
            "pages" => Some(FieldValue::Integer(i64::from(self.pages))),
            _ => None,
        }
    }

    fn transition(&mut self, action: StatusAction, now: &str) -> Result<Transition, AppError> {
        let target = match action {
            StatusAction::Publish => ResourceStatus::Published,
            StatusAction::Unpublish => ResourceStatus::Draft,
            StatusAction::Retire => ResourceStatus::Retired,
            other => return Err(unsupported_action(Self::KIND, other)),
        };
        let live = target == ResourceStatus::Published;
        if self.status == target && self.meta.is_published() == live {
            return Ok(Transition::Unchanged);
        }

        self.status = target;
        if live {
            self.meta.published_at = now.to_string();
        } else {
            self.meta.published_at.clear();
        }
        Ok(Transition::Applied)
    }

    fn validate_fields(&self) -> Result<(), AppError> {
        let live = self.status == ResourceStatus::Published;
        if live == self.meta.is_published() {
            return Ok(());
        }
        let problem = if live {
            "needs a publishedAt date"
        } else {
            "must not carry a publishedAt date"
        };
        Err(AppError::Validation(format!(
            "{} resource '{}' {}",
            self.status.as_str(),
            self.id,
            problem
        )))
    }

    fn seed() -> Vec<Self> {
        vec![
            Resource {
                summary: "Comptes certifiés et répartition des dépenses par programme.".to_string(),
                category: "transparence".to_string(),
                resource_type: "report".to_string(),
                tags: vec!["finances".to_string(), "rapport".to_string()],
                file_url: Some("/files/comptes-2024.pdf".to_string()),
                pages: 48,
                status: ResourceStatus::Published,
                meta: RecordMeta::new("2025-02-15T10:00:00Z", "2025-02-15T10:00:00Z"),
                ..Resource::new("res-comptes-2024", "Comptes annuels 2024")
            },
            Resource {
                summary: "Check-list pour évaluer un fournisseur local.".to_string(),
                category: "achats".to_string(),
                resource_type: "toolkit".to_string(),
                visibility: Visibility::Members,
                tags: vec!["fournisseurs".to_string(), "achats".to_string()],
                pages: 6,
                status: ResourceStatus::Published,
                meta: RecordMeta::new("2025-01-20T10:00:00Z", "2025-01-20T10:00:00Z"),
                ..Resource::new("res-eval-fournisseur", "Évaluer un fournisseur")
            },
            Resource {
                summary: "Guide de sécurité pour les missions terrain.".to_string(),
                category: "terrain".to_string(),
                resource_type: "guide".to_string(),
                tags: vec!["securite".to_string()],
                pages: 22,
                meta: RecordMeta::new("2025-03-05T10:00:00Z", ""),
                ..Resource::new("res-securite-terrain", "Sécurité sur le terrain")
            },
        ]
    }
}
