use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Startlist;
use crate::store::Database;

pub struct StartlistsRepository<'a> {
    db: &'a Database,
}

impl<'a> StartlistsRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, startlist: Startlist) -> Result<Uuid> {
        let mut startlists = self.db.startlists.write().await;
        if startlists.contains_key(&startlist.id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Startlist {} already exists.",
                startlist.id
            )));
        }
        let id = startlist.id;
        startlists.insert(id, startlist);
        Ok(id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Startlist> {
        self.db
            .startlists
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_event_id(&self, event_id: &str) -> Result<Vec<Startlist>> {
        Ok(self
            .db
            .startlists
            .read()
            .await
            .values()
            .filter(|startlist| startlist.event_id == event_id)
            .cloned()
            .collect())
    }

    pub async fn list(&self) -> Result<Vec<Startlist>> {
        let mut startlists: Vec<Startlist> =
            self.db.startlists.read().await.values().cloned().collect();
        startlists.sort_by(|a, b| a.event_id.cmp(&b.event_id));
        Ok(startlists)
    }

    pub async fn update(&self, id: Uuid, startlist: Startlist) -> Result<()> {
        let mut startlists = self.db.startlists.write().await;
        if !startlists.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        startlists.insert(id, startlist);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.db
            .startlists
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
