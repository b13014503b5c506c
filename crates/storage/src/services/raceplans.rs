use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Raceplan;
use crate::repository::RaceplansRepository;
use crate::store::Database;

pub struct RaceplansService;

impl RaceplansService {
    /// An event can have one, and only one, raceplan.
    pub async fn create_raceplan(db: &Database, raceplan: Raceplan) -> Result<Uuid> {
        let repo = RaceplansRepository::new(db);
        let existing = repo.find_by_event_id(&raceplan.event_id).await?;
        if !existing.is_empty() {
            return Err(StorageError::ConstraintViolation(format!(
                "Event \"{}\" already has a raceplan.",
                raceplan.event_id
            )));
        }
        repo.create(raceplan).await
    }

    pub async fn update_raceplan(db: &Database, id: Uuid, raceplan: Raceplan) -> Result<()> {
        let repo = RaceplansRepository::new(db);
        let old = repo.find_by_id(id).await?;
        if raceplan.id != old.id {
            return Err(StorageError::IllegalValue(
                "Cannot change id for raceplan.".to_string(),
            ));
        }
        repo.update(id, raceplan).await
    }

    pub async fn delete_raceplan(db: &Database, id: Uuid) -> Result<()> {
        let repo = RaceplansRepository::new(db);
        repo.find_by_id(id).await?;
        repo.delete(id).await
    }
}
