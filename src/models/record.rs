//! Shared record contract implemented by every stored entity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::AppError;

/// Status-changing operations a record may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    Publish,
    Unpublish,
    Retire,
    Activate,
    Suspend,
}

impl StatusAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAction::Publish => "publish",
            StatusAction::Unpublish => "unpublish",
            StatusAction::Retire => "retire",
            StatusAction::Activate => "activate",
            StatusAction::Suspend => "suspend",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(StatusAction::Publish),
            "unpublish" => Ok(StatusAction::Unpublish),
            "retire" => Ok(StatusAction::Retire),
            "activate" => Ok(StatusAction::Activate),
            "suspend" => Ok(StatusAction::Suspend),
            other => Err(AppError::Validation(format!("Unknown action '{}'", other))),
        }
    }
}

/// Outcome of applying a status action to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The record changed and must be written back.
    Applied,
    /// The record was already in the target state.
    Unchanged,
}

/// Timestamps carried by every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    #[serde(default)]
    pub updated_at: String,
    /// Empty means unpublished.
    #[serde(default)]
    pub published_at: String,
}

impl RecordMeta {
    pub fn new(updated_at: impl Into<String>, published_at: impl Into<String>) -> Self {
        Self {
            updated_at: updated_at.into(),
            published_at: published_at.into(),
        }
    }

    pub fn is_published(&self) -> bool {
        !self.published_at.is_empty()
    }

    /// Date used for sorting and date filters: publication, else last update.
    pub fn reference_date(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published_at).or_else(|| parse_timestamp(&self.updated_at))
    }

    /// Stamp `published_at` the first time a record goes live.
    pub fn stamp_first_listing(&mut self, now: &str) {
        if self.published_at.is_empty() {
            self.published_at = now.to_string();
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("updatedAt", &self.updated_at),
            ("publishedAt", &self.published_at),
        ] {
            if !value.is_empty() && parse_timestamp(value).is_none() {
                return Err(AppError::Validation(format!(
                    "{} '{}' is not an ISO timestamp",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// A single exportable field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
    Integer(i64),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<&[String]> for FieldValue {
    fn from(value: &[String]) -> Self {
        FieldValue::List(value.to_vec())
    }
}

/// Columns every record can export, resolved by [`Entity::column`].
pub const SHARED_COLUMNS: &[&str] = &["status", "tags", "updatedAt", "publishedAt"];

/// Path segments taken by collection routes; no record may use them as its key.
pub const RESERVED_KEYS: &[&str] = &["bulk", "export.csv"];

/// Contract shared by blog articles, resources, partners, team members and projects.
///
/// One implementor is stored as a JSON array under [`Entity::STORAGE_KEY`].
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human label used in messages, e.g. "blog article".
    const KIND: &'static str;
    /// Storage key of the collection blob.
    const STORAGE_KEY: &'static str;
    /// Names accepted as categorical equality filters.
    const FACETS: &'static [&'static str];
    /// Default CSV column order.
    const CSV_COLUMNS: &'static [&'static str];
    /// Entity-specific columns resolved by [`Entity::field`].
    const EXPORTABLE_COLUMNS: &'static [&'static str];

    fn key(&self) -> &str;

    /// Fill in the key of a record created without one.
    fn assign_key(&mut self);

    fn title(&self) -> &str;

    fn status_label(&self) -> &'static str;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn tags(&self) -> &[String];

    /// Text fields matched by the free-text query, tags excluded.
    fn search_fields(&self) -> Vec<&str>;

    /// Value of a categorical facet, `None` for unknown names.
    fn facet(&self, name: &str) -> Option<String>;

    /// Size measure used by the shortest/longest sorts.
    fn length(&self) -> usize;

    /// Entity-specific export columns; shared columns are resolved by [`Entity::column`].
    fn field(&self, name: &str) -> Option<FieldValue>;

    fn transition(&mut self, action: StatusAction, now: &str) -> Result<Transition, AppError>;

    /// Entity-specific shape checks run after the shared ones.
    fn validate_fields(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Records written by the seed step and used when the stored blob is corrupt.
    fn seed() -> Vec<Self>;

    fn column(&self, name: &str) -> Option<FieldValue> {
        match name {
            "status" => Some(FieldValue::Text(self.status_label().to_string())),
            "tags" => Some(FieldValue::from(self.tags())),
            "updatedAt" => Some(FieldValue::from(&self.meta().updated_at)),
            "publishedAt" => Some(FieldValue::from(&self.meta().published_at)),
            _ => self.field(name),
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.key().trim().is_empty() {
            return Err(AppError::Validation(format!("{} key is required", Self::KIND)));
        }
        if RESERVED_KEYS.contains(&self.key()) {
            return Err(AppError::Validation(format!(
                "'{}' is reserved and cannot be used as a {} key",
                self.key(),
                Self::KIND
            )));
        }
        if self.title().trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{} title is required",
                Self::KIND
            )));
        }
        self.meta().validate()?;
        self.validate_fields()
    }
}

/// Error for an action the entity type does not offer.
pub fn unsupported_action(kind: &str, action: StatusAction) -> AppError {
    AppError::Validation(format!("Action '{}' is not supported for {}", action, kind))
}

/// Current time as an RFC 3339 string with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn validate_email(kind: &str, email: &str) -> Result<(), AppError> {
    if email.is_empty() {
        return Ok(());
    }
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} email '{}' is invalid",
            kind, email
        )))
    }
}
