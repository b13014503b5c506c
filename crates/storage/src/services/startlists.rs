use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Startlist;
use crate::repository::StartlistsRepository;
use crate::store::Database;

pub struct StartlistsService;

impl StartlistsService {
    /// An event can have one, and only one, startlist.
    pub async fn create_startlist(db: &Database, startlist: Startlist) -> Result<Uuid> {
        let repo = StartlistsRepository::new(db);
        let existing = repo.find_by_event_id(&startlist.event_id).await?;
        if !existing.is_empty() {
            return Err(StorageError::ConstraintViolation(format!(
                "Event \"{}\" already has a startlist.",
                startlist.event_id
            )));
        }
        repo.create(startlist).await
    }

    pub async fn update_startlist(db: &Database, id: Uuid, startlist: Startlist) -> Result<()> {
        let repo = StartlistsRepository::new(db);
        let old = repo.find_by_id(id).await?;
        if startlist.id != old.id {
            return Err(StorageError::IllegalValue(
                "Cannot change id for startlist.".to_string(),
            ));
        }
        repo.update(id, startlist).await
    }

    pub async fn delete_startlist(db: &Database, id: Uuid) -> Result<()> {
        let repo = StartlistsRepository::new(db);
        repo.find_by_id(id).await?;
        repo.delete(id).await
    }
}
