use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Race;
use crate::store::Database;

pub struct RacesRepository<'a> {
    db: &'a Database,
}

impl<'a> RacesRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, race: Race) -> Result<Uuid> {
        let mut races = self.db.races.write().await;
        if races.contains_key(&race.id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Race {} already exists.",
                race.id
            )));
        }
        let id = race.id;
        races.insert(id, race);
        Ok(id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Race> {
        self.db
            .races
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_event_id(&self, event_id: &str) -> Result<Vec<Race>> {
        Ok(sorted_by_order(
            self.db
                .races
                .read()
                .await
                .values()
                .filter(|race| race.event_id == event_id)
                .cloned()
                .collect(),
        ))
    }

    pub async fn find_by_event_id_and_raceclass(
        &self,
        event_id: &str,
        raceclass: &str,
    ) -> Result<Vec<Race>> {
        Ok(sorted_by_order(
            self.db
                .races
                .read()
                .await
                .values()
                .filter(|race| race.event_id == event_id && race.raceclass == raceclass)
                .cloned()
                .collect(),
        ))
    }

    pub async fn find_by_raceplan_id(&self, raceplan_id: Uuid) -> Result<Vec<Race>> {
        Ok(sorted_by_order(
            self.db
                .races
                .read()
                .await
                .values()
                .filter(|race| race.raceplan_id == raceplan_id)
                .cloned()
                .collect(),
        ))
    }

    pub async fn list(&self) -> Result<Vec<Race>> {
        Ok(sorted_by_order(
            self.db.races.read().await.values().cloned().collect(),
        ))
    }

    pub async fn update(&self, id: Uuid, race: Race) -> Result<()> {
        let mut races = self.db.races.write().await;
        if !races.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        races.insert(id, race);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.db
            .races
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

fn sorted_by_order(mut races: Vec<Race>) -> Vec<Race> {
    races.sort_by_key(|race| race.order);
    races
}
