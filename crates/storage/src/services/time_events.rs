use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::TimeEvent;
use crate::repository::TimeEventsRepository;
use crate::store::Database;

pub struct TimeEventsService;

impl TimeEventsService {
    /// One observation per `(race, timing-point, bib)`; a second one is a
    /// conflict and must go through correction instead. Template events are
    /// exempt.
    pub async fn create_time_event(db: &Database, time_event: TimeEvent) -> Result<Uuid> {
        let repo = TimeEventsRepository::new(db);
        if let Some(race_id) = time_event.race_id {
            let in_race = repo.find_by_race_id(race_id).await?;
            let duplicate = in_race.iter().any(|existing| {
                existing.timing_point != "Template"
                    && existing.bib == time_event.bib
                    && existing.timing_point == time_event.timing_point
            });
            if duplicate && time_event.timing_point != "Template" {
                return Err(StorageError::ConstraintViolation(format!(
                    "Time-event for bib {:?} and timing-point {} already exists in race {}.",
                    time_event.bib, time_event.timing_point, race_id
                )));
            }
        }
        repo.create(time_event).await
    }

    pub async fn update_time_event(db: &Database, id: Uuid, time_event: TimeEvent) -> Result<()> {
        let repo = TimeEventsRepository::new(db);
        let old = repo.find_by_id(id).await?;
        if time_event.id != old.id {
            return Err(StorageError::IllegalValue(
                "Cannot change id for time_event.".to_string(),
            ));
        }
        repo.update(id, time_event).await
    }

    pub async fn delete_time_event(db: &Database, id: Uuid) -> Result<()> {
        let repo = TimeEventsRepository::new(db);
        repo.find_by_id(id).await?;
        repo.delete(id).await
    }
}
