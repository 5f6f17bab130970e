//! Project model with budget, operators and milestones.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::{unsupported_action, Entity, FieldValue, RecordMeta, StatusAction, Transition};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    Suspended,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::Active => "active",
            ProjectStatus::Suspended => "suspended",
            ProjectStatus::Completed => "completed",
        }
    }
}

/// A dated activity within a project plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub title: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub done: bool,
}

/// A field project reported on the transparency page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub spent: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// `YYYY-MM-DD`, empty when not scheduled.
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    /// Free-text names; not checked against the team store.
    #[serde(default)]
    pub operators: Vec<String>,
    #[serde(default)]
    pub beneficiaries: u32,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

impl Project {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            category: String::new(),
            country: String::new(),
            location: String::new(),
            budget: 0.0,
            spent: 0.0,
            currency: default_currency(),
            start_date: String::new(),
            end_date: String::new(),
            operators: Vec::new(),
            beneficiaries: 0,
            milestones: Vec::new(),
            tags: Vec::new(),
            status: ProjectStatus::Planned,
            meta: RecordMeta::default(),
        }
    }

    /// Scheduled duration in days, zero when either date is missing.
    pub fn duration_days(&self) -> usize {
        match (parse_date(&self.start_date), parse_date(&self.end_date)) {
            (Some(start), Some(end)) if end >= start => (end - start).num_days() as usize,
            _ => 0,
        }
    }

    /// Share of milestones marked done, in percent.
    pub fn progress(&self) -> u8 {
        if self.milestones.is_empty() {
            return 0;
        }
        let done = self.milestones.iter().filter(|m| m.done).count();
        ((done * 100) / self.milestones.len()) as u8
    }
}

impl Entity for Project {
    const KIND: &'static str = "project";
    const STORAGE_KEY: &'static str = "donorops.projects";
    const FACETS: &'static [&'static str] = &["status", "category", "country"];
    const CSV_COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "category",
        "country",
        "location",
        "budget",
        "spent",
        "currency",
        "startDate",
        "endDate",
        "operators",
        "beneficiaries",
        "progress",
        "tags",
        "status",
        "updatedAt",
    ];
    const EXPORTABLE_COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "summary",
        "category",
        "country",
        "location",
        "budget",
        "spent",
        "currency",
        "startDate",
        "endDate",
        "operators",
        "beneficiaries",
        "progress",
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
        let mut fields = vec![
            self.title.as_str(),
            self.summary.as_str(),
            self.location.as_str(),
        ];
        fields.extend(self.operators.iter().map(String::as_str));
        fields
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
        self.duration_days()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::from(&self.id)),
            "title" => Some(FieldValue::from(&self.title)),
            "summary" => Some(FieldValue::from(&self.summary)),
            "category" => Some(FieldValue::from(&self.category)),
            "country" => Some(FieldValue::from(&self.country)),
            "location" => Some(FieldValue::from(&self.location)),
            "budget" => Some(FieldValue::Number(self.budget)),
            "spent" => Some(FieldValue::Number(self.spent)),
            "currency" => Some(FieldValue::from(&self.currency)),
            "startDate" => Some(FieldValue::from(&self.start_date)),
            "endDate" => Some(FieldValue::from(&self.end_date)),
            "operators" => Some(FieldValue::from(self.operators.as_slice())),
            "beneficiaries" => Some(FieldValue::Integer(i64::from(self.beneficiaries))),
            "progress" => Some(FieldValue::Integer(i64::from(self.progress()))),
            _ => None,
        }
    }

    fn transition(&mut self, action: StatusAction, now: &str) -> Result<Transition, AppError> {
        let target = match action {
            StatusAction::Activate => ProjectStatus::Active,
            StatusAction::Suspend => ProjectStatus::Suspended,
            StatusAction::Retire => ProjectStatus::Completed,
            other => return Err(unsupported_action(Self::KIND, other)),
        };
        if self.status == target {
            return Ok(Transition::Unchanged);
        }
        self.status = target;
        if target == ProjectStatus::Active {
            self.meta.stamp_first_listing(now);
        }
        Ok(Transition::Applied)
    }

    fn validate_fields(&self) -> Result<(), AppError> {
        for (name, amount) in [("budget", self.budget), ("spent", self.spent)] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(AppError::Validation(format!(
                    "Project {} must be a non-negative amount",
                    name
                )));
            }
        }

        let start = match self.start_date.as_str() {
            "" => None,
            raw => Some(parse_date(raw).ok_or_else(|| {
                AppError::Validation(format!("Project startDate '{}' is not YYYY-MM-DD", raw))
            })?),
        };
        let end = match self.end_date.as_str() {
            "" => None,
            raw => Some(parse_date(raw).ok_or_else(|| {
                AppError::Validation(format!("Project endDate '{}' is not YYYY-MM-DD", raw))
            })?),
        };
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(AppError::Validation(
                    "Project endDate is before startDate".to_string(),
                ));
            }
        }

        if self.milestones.iter().any(|m| m.title.trim().is_empty()) {
            return Err(AppError::Validation(
                "Milestone title is required".to_string(),
            ));
        }
        Ok(())
    }

    fn seed() -> Vec<Self> {
        vec![
            Project {
                summary: "Forages équipés de pompes solaires pour trois villages.".to_string(),
                category: "eau".to_string(),
                country: "Burkina Faso".to_string(),
                location: "Kaya".to_string(),
                budget: 120_000.0,
                spent: 84_500.0,
                start_date: "2024-03-01".to_string(),
                end_date: "2025-06-30".to_string(),
                operators: vec!["Claire Martin".to_string(), "Kaya Relais".to_string()],
                beneficiaries: 4_200,
                milestones: vec![
                    Milestone {
                        title: "Études hydrogéologiques".to_string(),
                        due_date: "2024-05-15".to_string(),
                        done: true,
                    },
                    Milestone {
                        title: "Forage et équipement".to_string(),
                        due_date: "2025-02-28".to_string(),
                        done: true,
                    },
                    Milestone {
                        title: "Formation des comités de gestion".to_string(),
                        due_date: "2025-06-15".to_string(),
                        done: false,
                    },
                ],
                tags: vec!["eau".to_string(), "solaire".to_string()],
                status: ProjectStatus::Active,
                meta: RecordMeta::new("2025-03-10T08:00:00Z", "2024-03-01T08:00:00Z"),
                ..Project::new("prj-puits-kaya", "Puits solaires de Kaya")
            },
            Project {
                summary: "Semences résilientes et outils pour coopératives.".to_string(),
                category: "agriculture".to_string(),
                country: "Mali".to_string(),
                location: "Mopti".to_string(),
                budget: 65_000.0,
                spent: 12_000.0,
                start_date: "2025-01-15".to_string(),
                end_date: "2025-12-15".to_string(),
                operators: vec!["Ibrahim Koné".to_string()],
                beneficiaries: 900,
                tags: vec!["agriculture".to_string(), "resilience".to_string()],
                meta: RecordMeta::new("2025-02-01T08:00:00Z", ""),
                ..Project::new("prj-semences-mopti", "Semences de Mopti")
            },
            Project {
                summary: "Kits d'hygiène et sensibilisation dans les écoles.".to_string(),
                category: "eau".to_string(),
                country: "Sénégal".to_string(),
                location: "Thiès".to_string(),
                budget: 30_000.0,
                spent: 30_000.0,
                start_date: "2023-09-01".to_string(),
                end_date: "2024-07-31".to_string(),
                operators: vec!["Claire Martin".to_string()],
                beneficiaries: 2_500,
                tags: vec!["hygiene".to_string(), "ecoles".to_string()],
                status: ProjectStatus::Completed,
                meta: RecordMeta::new("2024-08-15T08:00:00Z", "2023-09-01T08:00:00Z"),
                ..Project::new("prj-hygiene-thies", "Hygiène à l'école, Thiès")
            },
        ]
    }
}
