use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Raceplan;
use crate::store::Database;

pub struct RaceplansRepository<'a> {
    db: &'a Database,
}

impl<'a> RaceplansRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, raceplan: Raceplan) -> Result<Uuid> {
        let mut raceplans = self.db.raceplans.write().await;
        if raceplans.contains_key(&raceplan.id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Raceplan {} already exists.",
                raceplan.id
            )));
        }
        let id = raceplan.id;
        raceplans.insert(id, raceplan);
        Ok(id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Raceplan> {
        self.db
            .raceplans
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_event_id(&self, event_id: &str) -> Result<Vec<Raceplan>> {
        Ok(self
            .db
            .raceplans
            .read()
            .await
            .values()
            .filter(|plan| plan.event_id == event_id)
            .cloned()
            .collect())
    }

    pub async fn list(&self) -> Result<Vec<Raceplan>> {
        let mut raceplans: Vec<Raceplan> =
            self.db.raceplans.read().await.values().cloned().collect();
        raceplans.sort_by(|a, b| a.event_id.cmp(&b.event_id));
        Ok(raceplans)
    }

    pub async fn update(&self, id: Uuid, raceplan: Raceplan) -> Result<()> {
        let mut raceplans = self.db.raceplans.write().await;
        if !raceplans.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        raceplans.insert(id, raceplan);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.db
            .raceplans
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
