use std::collections::BTreeMap;

use adapters::{CompetitionFormatsClient, EventsClient};
use storage::dto::race::RaceDetailResponse;
use storage::dto::race_result::RaceResultDetail;
use storage::models::{Race, TimeEvent};
use storage::repository::{
    RaceResultsRepository, RaceplansRepository, RacesRepository, StartEntriesRepository,
    TimeEventsRepository,
};
use storage::services::RacesService;
use storage::Database;
use uuid::Uuid;

use crate::error::WebResult;

pub async fn get_race_detail(db: &Database, id: Uuid) -> WebResult<RaceDetailResponse> {
    let race = RacesRepository::new(db).find_by_id(id).await?;
    hydrate_race(db, race).await
}

pub async fn get_race_details_by_raceclass(
    db: &Database,
    event_id: &str,
    raceclass: &str,
) -> WebResult<Vec<RaceDetailResponse>> {
    let races = RacesRepository::new(db)
        .find_by_event_id_and_raceclass(event_id, raceclass)
        .await?;
    let mut details = Vec::with_capacity(races.len());
    for race in races {
        details.push(hydrate_race(db, race).await?);
    }
    Ok(details)
}

/// Replace the start-entry and race-result references of a race with the
/// documents themselves. Template results stay internal.
async fn hydrate_race(db: &Database, race: Race) -> WebResult<RaceDetailResponse> {
    let start_entries = StartEntriesRepository::new(db)
        .find_by_race_id(race.id)
        .await?;

    let rr_repo = RaceResultsRepository::new(db);
    let te_repo = TimeEventsRepository::new(db);
    let mut results: BTreeMap<String, RaceResultDetail> = BTreeMap::new();
    for (timing_point, result_id) in &race.results {
        if timing_point == "Template" {
            continue;
        }
        let race_result = rr_repo.find_by_id(*result_id).await?;
        let mut ranking_sequence: Vec<TimeEvent> =
            Vec::with_capacity(race_result.ranking_sequence.len());
        for time_event_id in &race_result.ranking_sequence {
            ranking_sequence.push(te_repo.find_by_id(*time_event_id).await?);
        }
        results.insert(
            timing_point.clone(),
            RaceResultDetail::new(race_result, ranking_sequence),
        );
    }

    Ok(RaceDetailResponse::new(race, start_entries, results))
}

/// Create a race outside plan generation and attach it to its raceplan.
pub async fn create_race(db: &Database, race: Race) -> WebResult<Uuid> {
    let plans_repo = RaceplansRepository::new(db);
    let mut raceplan = plans_repo.find_by_id(race.raceplan_id).await?;
    let id = RacesService::create_race(db, race).await?;
    raceplan.races.push(id);
    plans_repo.update(raceplan.id, raceplan).await?;
    Ok(id)
}

/// Whole-document race update. A changed start time cascades to the
/// scheduled start times of the race's entries: interval races re-space
/// from the format's interval, everyone else starts on the gun.
pub async fn update_race(
    db: &Database,
    events: &EventsClient,
    formats: &CompetitionFormatsClient,
    token: &str,
    id: Uuid,
    race: Race,
) -> WebResult<()> {
    let old = RacesRepository::new(db).find_by_id(id).await?;
    RacesService::update_race(db, id, race.clone()).await?;

    if old.start_time != race.start_time {
        let interval = if race.is_sprint() {
            None
        } else {
            let event = events.get_event_by_id(token, &race.event_id).await?;
            let competition_format =
                formats.get_by_name(token, &event.competition_format).await?;
            competition_format.start_interval().ok()
        };

        let se_repo = StartEntriesRepository::new(db);
        for mut entry in se_repo.find_by_race_id(id).await? {
            entry.scheduled_start_time = match interval {
                Some(interval) => {
                    race.start_time + interval * (entry.starting_position as i32 - 1)
                }
                None => race.start_time,
            };
            se_repo.update(entry.id, entry).await?;
        }
    }
    Ok(())
}

/// Delete a race with its start-entries and race-results, and drop the
/// reference from its raceplan.
pub async fn delete_race(db: &Database, id: Uuid) -> WebResult<()> {
    let race = RacesRepository::new(db).find_by_id(id).await?;

    let se_repo = StartEntriesRepository::new(db);
    for entry in se_repo.find_by_race_id(id).await? {
        se_repo.delete(entry.id).await?;
    }
    let rr_repo = RaceResultsRepository::new(db);
    for result in rr_repo.find_by_race_id(id).await? {
        rr_repo.delete(result.id).await?;
    }

    let plans_repo = RaceplansRepository::new(db);
    if let Ok(mut raceplan) = plans_repo.find_by_id(race.raceplan_id).await {
        raceplan.races.retain(|&race_id| race_id != id);
        plans_repo.update(raceplan.id, raceplan).await?;
    }

    RacesService::delete_race(db, id).await?;
    Ok(())
}
