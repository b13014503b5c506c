use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::StartEntry;
use crate::store::Database;

pub struct StartEntriesRepository<'a> {
    db: &'a Database,
}

impl<'a> StartEntriesRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, start_entry: StartEntry) -> Result<Uuid> {
        let mut start_entries = self.db.start_entries.write().await;
        if start_entries.contains_key(&start_entry.id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Start-entry {} already exists.",
                start_entry.id
            )));
        }
        let id = start_entry.id;
        start_entries.insert(id, start_entry);
        Ok(id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<StartEntry> {
        self.db
            .start_entries
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// Entries of one race, sorted by starting position.
    pub async fn find_by_race_id(&self, race_id: Uuid) -> Result<Vec<StartEntry>> {
        let mut entries: Vec<StartEntry> = self
            .db
            .start_entries
            .read()
            .await
            .values()
            .filter(|entry| entry.race_id == race_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.starting_position);
        Ok(entries)
    }

    pub async fn find_by_race_id_and_startlist_id(
        &self,
        race_id: Uuid,
        startlist_id: Uuid,
    ) -> Result<Vec<StartEntry>> {
        let mut entries: Vec<StartEntry> = self
            .db
            .start_entries
            .read()
            .await
            .values()
            .filter(|entry| entry.race_id == race_id && entry.startlist_id == Some(startlist_id))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.starting_position);
        Ok(entries)
    }

    pub async fn find_by_race_id_and_bib(
        &self,
        race_id: Uuid,
        bib: u32,
    ) -> Result<Option<StartEntry>> {
        Ok(self
            .db
            .start_entries
            .read()
            .await
            .values()
            .find(|entry| entry.race_id == race_id && entry.bib == bib)
            .cloned())
    }

    pub async fn find_by_startlist_id(&self, startlist_id: Uuid) -> Result<Vec<StartEntry>> {
        let mut entries: Vec<StartEntry> = self
            .db
            .start_entries
            .read()
            .await
            .values()
            .filter(|entry| entry.startlist_id == Some(startlist_id))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| (entry.race_id, entry.starting_position));
        Ok(entries)
    }

    pub async fn update(&self, id: Uuid, start_entry: StartEntry) -> Result<()> {
        let mut start_entries = self.db.start_entries.write().await;
        if !start_entries.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        start_entries.insert(id, start_entry);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.db
            .start_entries
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
