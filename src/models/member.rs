//! Team member model.

use serde::{Deserialize, Serialize};

use super::record::{
    unsupported_action, validate_email, Entity, FieldValue, RecordMeta, StatusAction, Transition,
};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
        }
    }
}

/// A staff member or volunteer shown on the team page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: String,
    /// Skills and languages.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl TeamMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: String::new(),
            department: String::new(),
            email: String::new(),
            phone: None,
            bio: String::new(),
            tags: Vec::new(),
            photo: None,
            status: MemberStatus::Active,
            meta: RecordMeta::default(),
        }
    }
}

impl Entity for TeamMember {
    const KIND: &'static str = "team member";
    const STORAGE_KEY: &'static str = "donorops.team_members";
    const FACETS: &'static [&'static str] = &["status", "department", "role"];
    const CSV_COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "role",
        "department",
        "email",
        "phone",
        "tags",
        "status",
        "updatedAt",
    ];
    const EXPORTABLE_COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "role",
        "department",
        "email",
        "phone",
        "bio",
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
        &self.name
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
        vec![
            self.name.as_str(),
            self.role.as_str(),
            self.bio.as_str(),
            self.email.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.as_str().to_string()),
            "department" => Some(self.department.clone()),
            "role" => Some(self.role.clone()),
            _ => None,
        }
    }

    fn length(&self) -> usize {
        self.bio.chars().count()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::from(&self.id)),
            "name" => Some(FieldValue::from(&self.name)),
            "role" => Some(FieldValue::from(&self.role)),
            "department" => Some(FieldValue::from(&self.department)),
            "email" => Some(FieldValue::from(&self.email)),
            "phone" => Some(FieldValue::Text(self.phone.clone().unwrap_or_default())),
            "bio" => Some(FieldValue::from(&self.bio)),
            _ => None,
        }
    }

    fn transition(&mut self, action: StatusAction, now: &str) -> Result<Transition, AppError> {
        let target = match action {
            StatusAction::Activate => MemberStatus::Active,
            StatusAction::Suspend => MemberStatus::Inactive,
            other => return Err(unsupported_action(Self::KIND, other)),
        };
        if self.status == target {
            return Ok(Transition::Unchanged);
        }
        self.status = target;
        if target == MemberStatus::Active {
            self.meta.stamp_first_listing(now);
        }
        Ok(Transition::Applied)
    }

    fn validate_fields(&self) -> Result<(), AppError> {
        validate_email(Self::KIND, &self.email)
    }

    fn seed() -> Vec<Self> {
        vec![
            TeamMember {
                role: "Directrice des programmes".to_string(),
                department: "programmes".to_string(),
                email: "claire.martin@donorops.example".to_string(),
                bio: "Quinze ans de coordination de projets eau et assainissement.".to_string(),
                tags: vec!["wash".to_string(), "francais".to_string(), "anglais".to_string()],
                meta: RecordMeta::new("2025-01-05T08:00:00Z", "2023-09-01T08:00:00Z"),
                ..TeamMember::new("tm-claire-martin", "Claire Martin")
            },
            TeamMember {
                role: "Chargé de partenariats".to_string(),
                department: "partenariats".to_string(),
                email: "ibrahim.kone@donorops.example".to_string(),
                bio: "Suit les fournisseurs et distributeurs en Afrique de l'Ouest.".to_string(),
                tags: vec!["achats".to_string(), "bambara".to_string()],
                meta: RecordMeta::new("2025-02-11T08:00:00Z", "2024-02-01T08:00:00Z"),
                ..TeamMember::new("tm-ibrahim-kone", "Ibrahim Koné")
            },
            TeamMember {
                role: "Comptable".to_string(),
                department: "finances".to_string(),
                email: "lea.dubois@donorops.example".to_string(),
                tags: vec!["finances".to_string()],
                status: MemberStatus::Inactive,
                meta: RecordMeta::new("2024-12-01T08:00:00Z", "2022-03-01T08:00:00Z"),
                ..TeamMember::new("tm-lea-dubois", "Léa Dubois")
            },
        ]
    }
}
