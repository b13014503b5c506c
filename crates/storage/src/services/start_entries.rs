use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::StartEntry;
use crate::repository::StartEntriesRepository;
use crate::store::Database;

pub struct StartEntriesService;

impl StartEntriesService {
    /// Bibs and starting positions must be unique within the race.
    pub async fn create_start_entry(db: &Database, start_entry: StartEntry) -> Result<Uuid> {
        let repo = StartEntriesRepository::new(db);
        let in_race = repo.find_by_race_id(start_entry.race_id).await?;
        if in_race.iter().any(|entry| entry.bib == start_entry.bib) {
            return Err(StorageError::ConstraintViolation(format!(
                "Bib {} is already in the race.",
                start_entry.bib
            )));
        }
        if in_race
            .iter()
            .any(|entry| entry.starting_position == start_entry.starting_position)
        {
            return Err(StorageError::ConstraintViolation(format!(
                "Starting-position {} is taken.",
                start_entry.starting_position
            )));
        }
        repo.create(start_entry).await
    }

    pub async fn update_start_entry(
        db: &Database,
        id: Uuid,
        start_entry: StartEntry,
    ) -> Result<()> {
        let repo = StartEntriesRepository::new(db);
        let old = repo.find_by_id(id).await?;
        if start_entry.id != old.id {
            return Err(StorageError::IllegalValue(
                "Cannot change id for start_entry.".to_string(),
            ));
        }
        repo.update(id, start_entry).await
    }

    pub async fn delete_start_entry(db: &Database, id: Uuid) -> Result<()> {
        let repo = StartEntriesRepository::new(db);
        repo.find_by_id(id).await?;
        repo.delete(id).await
    }
}
