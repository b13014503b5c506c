use storage::models::{TimeEvent, TimeEventStatus};
use storage::services::RaceResultsService;
use storage::Database;
use uuid::Uuid;

use crate::error::WebResult;

/// Outcome of registering a time-event: the stored document, and whether
/// processing accepted it into the race-result.
pub struct RegisteredTimeEvent {
    pub time_event: TimeEvent,
    pub accepted: bool,
}

/// Register one timing observation. The document is stored even when
/// processing rejects it (`status="Error"`), so the timekeeper can correct
/// instead of re-measure; only duplicates are refused outright.
pub async fn register_time_event(
    db: &Database,
    time_event: TimeEvent,
) -> WebResult<RegisteredTimeEvent> {
    let stored = RaceResultsService::create_and_process_time_event(db, time_event).await?;
    let accepted = stored.status == TimeEventStatus::Ok;
    Ok(RegisteredTimeEvent {
        time_event: stored,
        accepted,
    })
}

pub async fn delete_time_event(db: &Database, id: Uuid) -> WebResult<()> {
    RaceResultsService::delete_time_event(db, id).await?;
    Ok(())
}
