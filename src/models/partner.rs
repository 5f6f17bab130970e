//! Supplier and distributor models.
//!
//! Both partner kinds share the French status vocabulary used by the field teams.

use serde::{Deserialize, Serialize};

use super::record::{
    unsupported_action, validate_email, Entity, FieldValue, RecordMeta, StatusAction, Transition,
};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    Actif,
    Inactif,
    #[default]
    EnRevue,
}

impl PartnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerStatus::Actif => "actif",
            PartnerStatus::Inactif => "inactif",
            PartnerStatus::EnRevue => "en_revue",
        }
    }

    fn apply(
        &mut self,
        kind: &str,
        meta: &mut RecordMeta,
        action: StatusAction,
        now: &str,
    ) -> Result<Transition, AppError> {
        let target = match action {
            StatusAction::Activate => PartnerStatus::Actif,
            StatusAction::Suspend => PartnerStatus::Inactif,
            other => return Err(unsupported_action(kind, other)),
        };
        if *self == target {
            return Ok(Transition::Unchanged);
        }
        *self = target;
        if target == PartnerStatus::Actif {
            meta.stamp_first_listing(now);
        }
        Ok(Transition::Applied)
    }
}

/// A vetted supplier of goods or services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// 1 to 5, absent when not yet evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default)]
    pub status: PartnerStatus,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Supplier {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            country: String::new(),
            city: String::new(),
            contact_name: String::new(),
            contact_email: String::new(),
            phone: String::new(),
            website: None,
            description: String::new(),
            tags: Vec::new(),
            rating: None,
            status: PartnerStatus::EnRevue,
            meta: RecordMeta::default(),
        }
    }
}

impl Entity for Supplier {
    const KIND: &'static str = "supplier";
    const STORAGE_KEY: &'static str = "donorops.suppliers";
    const FACETS: &'static [&'static str] = &["status", "category", "country"];
    const CSV_COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "category",
        "country",
        "city",
        "contactName",
        "contactEmail",
        "phone",
        "tags",
        "rating",
        "status",
        "description",
        "updatedAt",
    ];
    const EXPORTABLE_COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "category",
        "country",
        "city",
        "contactName",
        "contactEmail",
        "phone",
        "website",
        "description",
        "rating",
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
            self.description.as_str(),
            self.city.as_str(),
            self.contact_name.as_str(),
        ]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.as_str().to_string()),
            "category" => Some(self.category.clone()),
            "country" => Some(self.country.clone()),
            _ => None,
        }
    }

    fn length(&self) -> usize {
        self.description.chars().count()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::from(&self.id)),
            "name" => Some(FieldValue::from(&self.name)),
            "category" => Some(FieldValue::from(&self.category)),
            "country" => Some(FieldValue::from(&self.country)),
            "city" => Some(FieldValue::from(&self.city)),
            "contactName" => Some(FieldValue::from(&self.contact_name)),
            "contactEmail" => Some(FieldValue::from(&self.contact_email)),
            "phone" => Some(FieldValue::from(&self.phone)),
            "website" => Some(FieldValue::Text(self.website.clone().unwrap_or_default())),
            "description" => Some(FieldValue::from(&self.description)),
            "rating" => Some(match self.rating {
                Some(rating) => FieldValue::Integer(i64::from(rating)),
                None => FieldValue::Text(String::new()),
            }),
            _ => None,
        }
    }

    fn transition(&mut self, action: StatusAction, now: &str) -> Result<Transition, AppError> {
        self.status.apply(Self::KIND, &mut self.meta, action, now)
    }

    fn validate_fields(&self) -> Result<(), AppError> {
        validate_email(Self::KIND, &self.contact_email)?;
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::Validation(format!(
                    "Supplier rating {} is outside 1..=5",
                    rating
                )));
            }
        }
        Ok(())
    }

    fn seed() -> Vec<Self> {
        vec![
            Supplier {
                category: "materiaux".to_string(),
                country: "Burkina Faso".to_string(),
                city: "Ouagadougou".to_string(),
                contact_name: "Awa Ouédraogo".to_string(),
                contact_email: "contact@solaire-bf.example".to_string(),
                description: "Pompes et panneaux solaires pour forages.".to_string(),
                tags: vec!["solaire".to_string(), "eau".to_string()],
                rating: Some(4),
                status: PartnerStatus::Actif,
                meta: RecordMeta::new("2025-01-10T08:00:00Z", "2024-06-01T08:00:00Z"),
                ..Supplier::new("sup-solaire-bf", "Solaire BF")
            },
            Supplier {
                category: "logistique".to_string(),
                country: "Sénégal".to_string(),
                city: "Dakar".to_string(),
                contact_name: "Moussa Diop".to_string(),
                contact_email: "fret@transsahel.example".to_string(),
                description: "Transport routier Dakar - Bamako, entreposage.".to_string(),
                tags: vec!["transport".to_string()],
                meta: RecordMeta::new("2025-02-02T08:00:00Z", ""),
                ..Supplier::new("sup-transsahel", "TransSahel Logistique")
            },
        ]
    }
}

/// A local distributor that delivers aid to beneficiaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distributor {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub phone: String,
    /// Zones served, in priority order.
    #[serde(default)]
    pub coverage: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PartnerStatus,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Distributor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: String::new(),
            country: String::new(),
            contact_name: String::new(),
            contact_email: String::new(),
            phone: String::new(),
            coverage: Vec::new(),
            description: String::new(),
            tags: Vec::new(),
            status: PartnerStatus::EnRevue,
            meta: RecordMeta::default(),
        }
    }
}

impl Entity for Distributor {
    const KIND: &'static str = "distributor";
    const STORAGE_KEY: &'static str = "donorops.distributors";
    const FACETS: &'static [&'static str] = &["status", "region", "country"];
    const CSV_COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "region",
        "country",
        "contactName",
        "contactEmail",
        "phone",
        "coverage",
        "tags",
        "status",
        "updatedAt",
    ];
    const EXPORTABLE_COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "region",
        "country",
        "contactName",
        "contactEmail",
        "phone",
        "coverage",
        "description",
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
        let mut fields = vec![
            self.name.as_str(),
            self.description.as_str(),
            self.contact_name.as_str(),
        ];
        fields.extend(self.coverage.iter().map(String::as_str));
        fields
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "status" => Some(self.status.as_str().to_string()),
            "region" => Some(self.region.clone()),
            "country" => Some(self.country.clone()),
            _ => None,
        }
    }

    fn length(&self) -> usize {
        self.coverage.len()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::from(&self.id)),
            "name" => Some(FieldValue::from(&self.name)),
            "region" => Some(FieldValue::from(&self.region)),
            "country" => Some(FieldValue::from(&self.country)),
            "contactName" => Some(FieldValue::from(&self.contact_name)),
            "contactEmail" => Some(FieldValue::from(&self.contact_email)),
            "phone" => Some(FieldValue::from(&self.phone)),
            "coverage" => Some(FieldValue::from(self.coverage.as_slice())),
            "description" => Some(FieldValue::from(&self.description)),
            _ => None,
        }
    }

    fn transition(&mut self, action: StatusAction, now: &str) -> Result<Transition, AppError> {
        self.status.apply(Self::KIND, &mut self.meta, action, now)
    }

    fn validate_fields(&self) -> Result<(), AppError> {
        validate_email(Self::KIND, &self.contact_email)
    }

    fn seed() -> Vec<Self> {
        vec![
            Distributor {
                region: "Centre-Nord".to_string(),
                country: "Burkina Faso".to_string(),
                contact_name: "Issa Sawadogo".to_string(),
                contact_email: "issa@kaya-relais.example".to_string(),
                coverage: vec!["Kaya".to_string(), "Barsalogho".to_string()],
                description: "Réseau de relais communautaires pour kits d'hygiène.".to_string(),
                tags: vec!["hygiene".to_string(), "communautaire".to_string()],
                status: PartnerStatus::Actif,
                meta: RecordMeta::new("2025-01-15T08:00:00Z", "2024-09-01T08:00:00Z"),
                ..Distributor::new("dist-kaya-relais", "Kaya Relais")
            },
            Distributor {
                region: "Mopti".to_string(),
                country: "Mali".to_string(),
                contact_name: "Fatoumata Traoré".to_string(),
                coverage: vec!["Mopti".to_string()],
                description: "Distribution de semences et d'outils agricoles.".to_string(),
                tags: vec!["agriculture".to_string()],
                meta: RecordMeta::new("2025-02-20T08:00:00Z", ""),
                ..Distributor::new("dist-mopti-agri", "Mopti Agri Services")
            },
        ]
    }
}
