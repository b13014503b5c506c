use storage::dto::race_result::RaceResultDetail;
use storage::models::{RaceResult, TimeEvent};
use storage::repository::{RaceResultsRepository, TimeEventsRepository};
use storage::Database;
use uuid::Uuid;

use crate::error::WebResult;

pub async fn list_race_results(
    db: &Database,
    race_id: Uuid,
    timing_point: Option<&str>,
) -> WebResult<Vec<RaceResult>> {
    let repo = RaceResultsRepository::new(db);
    let results = match timing_point {
        Some(timing_point) => repo
            .find_by_race_id_and_timing_point(race_id, timing_point)
            .await?
            .into_iter()
            .collect(),
        None => repo.find_by_race_id(race_id).await?,
    };
    Ok(results)
}

pub async fn hydrate(db: &Database, race_result: RaceResult) -> WebResult<RaceResultDetail> {
    let te_repo = TimeEventsRepository::new(db);
    let mut ranking_sequence: Vec<TimeEvent> =
        Vec::with_capacity(race_result.ranking_sequence.len());
    for time_event_id in &race_result.ranking_sequence {
        ranking_sequence.push(te_repo.find_by_id(*time_event_id).await?);
    }
    Ok(RaceResultDetail::new(race_result, ranking_sequence))
}
