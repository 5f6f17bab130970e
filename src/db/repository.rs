//! Entity stores over the blob storage.
//!
//! Each entity type lives in one JSON array; every mutation is a full
//! read-modify-write of that array.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::Storage;
use crate::errors::AppError;
use crate::models::{
    now_timestamp, BlogArticle, Datastore, Distributor, Entity, Project, Resource, RevisionInfo,
    StatusAction, Supplier, TeamMember, Transition, SCHEMA_VERSION,
};
use crate::view::{sort_records, SortKey};

/// Handle shared by all handlers; vends one [`EntityStore`] per entity type.
#[derive(Clone)]
pub struct Repository {
    storage: Arc<dyn Storage>,
    write_gate: Arc<Mutex<()>>,
}

impl Repository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Store for entity type `E`. Stores share the storage and the write gate.
    pub fn store<E: Entity>(&self) -> EntityStore<E> {
        EntityStore {
            storage: self.storage.clone(),
            write_gate: self.write_gate.clone(),
            _entity: PhantomData,
        }
    }

    /// Get revision info.
    pub async fn revision(&self) -> Result<RevisionInfo, AppError> {
        self.storage.revision().await
    }

    /// Get the current revision ID.
    pub async fn revision_id(&self) -> Result<i64, AppError> {
        Ok(self.storage.revision().await?.revision_id)
    }

    /// Get the full datastore.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let revision = self.revision().await?;

        Ok(Datastore {
            schema_version: SCHEMA_VERSION,
            generated_at: revision.generated_at,
            revision_id: revision.revision_id,
            articles: self.store::<BlogArticle>().list().await?,
            resources: self.store::<Resource>().list().await?,
            suppliers: self.store::<Supplier>().list().await?,
            distributors: self.store::<Distributor>().list().await?,
            members: self.store::<TeamMember>().list().await?,
            projects: self.store::<Project>().list().await?,
        })
    }
}

/// Keyed collection of one entity type persisted under `E::STORAGE_KEY`.
pub struct EntityStore<E> {
    storage: Arc<dyn Storage>,
    write_gate: Arc<Mutex<()>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            write_gate: self.write_gate.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityStore<E> {
    /// List all records, newest first.
    pub async fn list(&self) -> Result<Vec<E>, AppError> {
        let mut records = self.load().await?;
        sort_records(&mut records, SortKey::Newest);
        Ok(records)
    }

    /// Get a record by key.
    pub async fn get(&self, key: &str) -> Result<Option<E>, AppError> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|record| record.key() == key))
    }

    /// Insert or replace a record by key.
    pub async fn upsert(&self, mut record: E) -> Result<E, AppError> {
        record.meta_mut().updated_at = now_timestamp();
        record.validate()?;

        let _guard = self.write_gate.lock().await;
        let mut records = self.load().await?;

        match records.iter().position(|r| r.key() == record.key()) {
            Some(index) => records[index] = record.clone(),
            None => records.insert(0, record.clone()),
        }

        self.save(&records).await?;
        tracing::debug!("Upserted {} {}", E::KIND, record.key());
        Ok(record)
    }

    /// Replace an existing record. `None` when the key is absent; nothing is
    /// written then.
    pub async fn replace(&self, mut record: E) -> Result<Option<E>, AppError> {
        record.meta_mut().updated_at = now_timestamp();
        record.validate()?;

        let _guard = self.write_gate.lock().await;
        let mut records = self.load().await?;

        let Some(slot) = records.iter_mut().find(|r| r.key() == record.key()) else {
            return Ok(None);
        };
        *slot = record.clone();

        self.save(&records).await?;
        tracing::debug!("Replaced {} {}", E::KIND, record.key());
        Ok(Some(record))
    }

    /// Delete a record. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let _guard = self.write_gate.lock().await;
        let mut records = self.load().await?;

        let before = records.len();
        records.retain(|record| record.key() != key);
        if records.len() == before {
            return Ok(false);
        }

        self.save(&records).await?;
        tracing::debug!("Deleted {} {}", E::KIND, key);
        Ok(true)
    }

    /// Apply a status action. `None` if the key is absent.
    pub async fn apply(&self, key: &str, action: StatusAction) -> Result<Option<E>, AppError> {
        Ok(self
            .apply_with_outcome(key, action)
            .await?
            .map(|(record, _)| record))
    }

    /// Like [`EntityStore::apply`], also reporting whether anything changed.
    /// An unchanged record is not written back.
    pub async fn apply_with_outcome(
        &self,
        key: &str,
        action: StatusAction,
    ) -> Result<Option<(E, Transition)>, AppError> {
        let _guard = self.write_gate.lock().await;
        let mut records = self.load().await?;

        let Some(record) = records.iter_mut().find(|record| record.key() == key) else {
            return Ok(None);
        };

        let now = now_timestamp();
        match record.transition(action, &now)? {
            Transition::Unchanged => Ok(Some((record.clone(), Transition::Unchanged))),
            Transition::Applied => {
                record.meta_mut().updated_at = now;
                let updated = record.clone();
                self.save(&records).await?;
                tracing::debug!("Applied {} to {} {}", action, E::KIND, key);
                Ok(Some((updated, Transition::Applied)))
            }
        }
    }

    /// Write the seed collection when nothing valid is stored yet.
    ///
    /// Returns whether seed data was written.
    pub async fn seed_if_absent(&self) -> Result<bool, AppError> {
        let _guard = self.write_gate.lock().await;

        if let Some(raw) = self.storage.get(E::STORAGE_KEY).await? {
            if serde_json::from_str::<Vec<E>>(&raw).is_ok() {
                return Ok(false);
            }
            tracing::warn!("Replacing corrupt {} collection with seed data", E::KIND);
        }

        self.save(&E::seed()).await?;
        Ok(true)
    }

    async fn load(&self) -> Result<Vec<E>, AppError> {
        let Some(raw) = self.storage.get(E::STORAGE_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<E>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    "Stored {} collection is unreadable ({}), using seed data",
                    E::KIND,
                    e
                );
                Ok(E::seed())
            }
        }
    }

    async fn save(&self, records: &[E]) -> Result<(), AppError> {
        let raw = serde_json::to_string(records).map_err(|e| {
            tracing::error!("Failed to serialize {} collection: {}", E::KIND, e);
            AppError::Storage(format!("Failed to serialize {} collection: {}", E::KIND, e))
        })?;

        self.storage
            .set(E::STORAGE_KEY, &raw)
            .await
            .inspect_err(|e| tracing::error!("Failed to write {} collection: {}", E::KIND, e))
    }
}

/// Named setters, one per status action.
impl<E: Entity> EntityStore<E> {
    pub async fn publish(&self, key: &str) -> Result<Option<E>, AppError> {
        self.apply(key, StatusAction::Publish).await
    }

    pub async fn unpublish(&self, key: &str) -> Result<Option<E>, AppError> {
        self.apply(key, StatusAction::Unpublish).await
    }

    pub async fn retire(&self, key: &str) -> Result<Option<E>, AppError> {
        self.apply(key, StatusAction::Retire).await
    }

    pub async fn activate(&self, key: &str) -> Result<Option<E>, AppError> {
        self.apply(key, StatusAction::Activate).await
    }

    pub async fn suspend(&self, key: &str) -> Result<Option<E>, AppError> {
        self.apply(key, StatusAction::Suspend).await
    }
}
