use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::TimeEvent;
use crate::store::Database;

pub struct TimeEventsRepository<'a> {
    db: &'a Database,
}

impl<'a> TimeEventsRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, time_event: TimeEvent) -> Result<Uuid> {
        let mut time_events = self.db.time_events.write().await;
        if time_events.contains_key(&time_event.id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Time-event {} already exists.",
                time_event.id
            )));
        }
        let id = time_event.id;
        time_events.insert(id, time_event);
        Ok(id)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<TimeEvent> {
        self.db
            .time_events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_event_id(&self, event_id: &str) -> Result<Vec<TimeEvent>> {
        Ok(sorted_by_registration(
            self.db
                .time_events
                .read()
                .await
                .values()
                .filter(|time_event| time_event.event_id == event_id)
                .cloned()
                .collect(),
        ))
    }

    pub async fn find_by_event_id_and_timing_point(
        &self,
        event_id: &str,
        timing_point: &str,
    ) -> Result<Vec<TimeEvent>> {
        Ok(sorted_by_registration(
            self.db
                .time_events
                .read()
                .await
                .values()
                .filter(|time_event| {
                    time_event.event_id == event_id && time_event.timing_point == timing_point
                })
                .cloned()
                .collect(),
        ))
    }

    pub async fn find_by_event_id_and_bib(
        &self,
        event_id: &str,
        bib: u32,
    ) -> Result<Vec<TimeEvent>> {
        Ok(sorted_by_registration(
            self.db
                .time_events
                .read()
                .await
                .values()
                .filter(|time_event| {
                    time_event.event_id == event_id && time_event.bib == Some(bib)
                })
                .cloned()
                .collect(),
        ))
    }

    pub async fn find_by_race_id(&self, race_id: Uuid) -> Result<Vec<TimeEvent>> {
        Ok(sorted_by_registration(
            self.db
                .time_events
                .read()
                .await
                .values()
                .filter(|time_event| time_event.race_id == Some(race_id))
                .cloned()
                .collect(),
        ))
    }

    pub async fn find_by_race_id_and_timing_point(
        &self,
        race_id: Uuid,
        timing_point: &str,
    ) -> Result<Vec<TimeEvent>> {
        Ok(sorted_by_registration(
            self.db
                .time_events
                .read()
                .await
                .values()
                .filter(|time_event| {
                    time_event.race_id == Some(race_id)
                        && time_event.timing_point == timing_point
                })
                .cloned()
                .collect(),
        ))
    }

    pub async fn list(&self) -> Result<Vec<TimeEvent>> {
        Ok(sorted_by_registration(
            self.db.time_events.read().await.values().cloned().collect(),
        ))
    }

    pub async fn update(&self, id: Uuid, time_event: TimeEvent) -> Result<()> {
        let mut time_events = self.db.time_events.write().await;
        if !time_events.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        time_events.insert(id, time_event);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.db
            .time_events
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

fn sorted_by_registration(mut time_events: Vec<TimeEvent>) -> Vec<TimeEvent> {
    time_events.sort_by_key(|time_event| (time_event.registration_time, time_event.bib));
    time_events
}
