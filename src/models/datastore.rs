//! Full snapshot of every collection, used for backups and client bootstrap.

use serde::{Deserialize, Serialize};

use super::{BlogArticle, Distributor, Project, Resource, Supplier, TeamMember};

/// Current shape version of the snapshot document.
pub const SCHEMA_VERSION: i32 = 1;

/// The root datastore containing all application data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datastore {
    pub schema_version: i32,
    pub generated_at: String,
    pub revision_id: i64,
    pub articles: Vec<BlogArticle>,
    pub resources: Vec<Resource>,
    pub suppliers: Vec<Supplier>,
    pub distributors: Vec<Distributor>,
    pub members: Vec<TeamMember>,
    pub projects: Vec<Project>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
