//! Data models for the DonorOps back-office.
//!
//! Every entity is a plain struct serialized as camelCase JSON and stored as one
//! JSON array per entity type.

mod blog;
mod datastore;
mod member;
mod partner;
mod project;
mod record;
mod resource;

pub use blog::*;
pub use datastore::*;
pub use member::*;
pub use partner::*;
pub use project::*;
pub use record::*;
pub use resource::*;
