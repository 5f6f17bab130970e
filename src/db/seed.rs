//! Startup seeding of the demo collections.

use super::Repository;
use crate::errors::AppError;
use crate::models::{BlogArticle, Distributor, Entity, Project, Resource, Supplier, TeamMember};

/// Outcome of one seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Kinds whose collection was written.
    pub seeded: Vec<&'static str>,
    /// Kinds that already had data.
    pub skipped: Vec<&'static str>,
}

async fn seed_one<E: Entity>(repo: &Repository, report: &mut SeedReport) -> Result<(), AppError> {
    if repo.store::<E>().seed_if_absent().await? {
        tracing::info!("Seeded {} {} records", E::seed().len(), E::KIND);
        report.seeded.push(E::KIND);
    } else {
        report.skipped.push(E::KIND);
    }
    Ok(())
}

/// Seed every collection that has no stored data. Safe to run on every start.
pub async fn seed_all(repo: &Repository) -> Result<SeedReport, AppError> {
    let mut report = SeedReport::default();

    seed_one::<BlogArticle>(repo, &mut report).await?;
    seed_one::<Resource>(repo, &mut report).await?;
    seed_one::<Supplier>(repo, &mut report).await?;
    seed_one::<Distributor>(repo, &mut report).await?;
    seed_one::<TeamMember>(repo, &mut report).await?;
    seed_one::<Project>(repo, &mut report).await?;

    tracing::info!(
        "Seeding done: {} seeded, {} already present",
        report.seeded.len(),
        report.skipped.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_all_twice() {
        let repo = Repository::new(Arc::new(MemoryStorage::new()));

        let first = seed_all(&repo).await.unwrap();
        assert_eq!(first.seeded.len(), 6);
        assert!(first.skipped.is_empty());

        let revision = repo.revision_id().await.unwrap();
        let second = seed_all(&repo).await.unwrap();
        assert!(second.seeded.is_empty());
        assert_eq!(second.skipped.len(), 6);
        assert_eq!(repo.revision_id().await.unwrap(), revision);
    }
}
