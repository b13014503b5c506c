use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::RaceResult;
use crate::store::Database;

pub struct RaceResultsRepository<'a> {
    db: &'a Database,
}

impl<'a> RaceResultsRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, race_result: RaceResult) -> Result<Uuid> {
        let mut race_results = self.db.race_results.write().await;
        if race_results.contains_key(&race_result.id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Race-result {} already exists.",
                race_result.id
            )));
        }
        if race_results.values().any(|existing| {
            existing.race_id == race_result.race_id
                && existing.timing_point == race_result.timing_point
        }) {
            return Err(StorageError::ConstraintViolation(format!(
                "Race {} already has a result for timing-point {}.",
                race_result.race_id, race_result.timing_point
            )));
        }
        let id = race_result.id;
        race_results.insert(id, race_result);
        Ok(id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<RaceResult> {
        self.db
            .race_results
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_race_id(&self, race_id: Uuid) -> Result<Vec<RaceResult>> {
        let mut results: Vec<RaceResult> = self
            .db
            .race_results
            .read()
            .await
            .values()
            .filter(|result| result.race_id == race_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| a.timing_point.cmp(&b.timing_point));
        Ok(results)
    }

    /// At most one result exists per `(race_id, timing_point)`.
    pub async fn find_by_race_id_and_timing_point(
        &self,
        race_id: Uuid,
        timing_point: &str,
    ) -> Result<Option<RaceResult>> {
        Ok(self
            .db
            .race_results
            .read()
            .await
            .values()
            .find(|result| result.race_id == race_id && result.timing_point == timing_point)
            .cloned())
    }

    pub async fn update(&self, id: Uuid, race_result: RaceResult) -> Result<()> {
        let mut race_results = self.db.race_results.write().await;
        if !race_results.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        race_results.insert(id, race_result);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.db
            .race_results
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}
