use storage::dto::start_entry::CreateStartEntryRequest;
use storage::error::StorageError;
use storage::models::StartEntry;
use storage::repository::{
    RaceplansRepository, RacesRepository, StartEntriesRepository, StartlistsRepository,
};
use storage::services::StartEntriesService;
use storage::Database;
use uuid::Uuid;

use crate::error::{WebError, WebResult};

/// Add a start-entry to a race, keeping the race, startlist and raceplan
/// bookkeeping consistent. Entries carrying a startlist reference are
/// first-round entries and count toward the startlist and plan totals.
pub async fn create_start_entry(
    db: &Database,
    race_id: Uuid,
    mut request: CreateStartEntryRequest,
) -> WebResult<Uuid> {
    request.race_id = race_id;

    let races_repo = RacesRepository::new(db);
    let mut race = races_repo.find_by_id(race_id).await?;
    if race.start_entries.len() as u32 >= race.max_no_of_contestants {
        return Err(StorageError::ConstraintViolation(
            "Cannot add start-entry: race is full.".to_string(),
        )
        .into());
    }

    let startlist_id = request.startlist_id;
    if let Some(startlist_id) = startlist_id {
        StartlistsRepository::new(db).find_by_id(startlist_id).await?;
    }

    let entry = request.into_start_entry();
    let entry_id = StartEntriesService::create_start_entry(db, entry).await?;

    race.start_entries.push(entry_id);
    race.no_of_contestants = race.start_entries.len() as u32;
    races_repo.update(race_id, race.clone()).await?;

    if let Some(startlist_id) = startlist_id {
        let startlists_repo = StartlistsRepository::new(db);
        let mut startlist = startlists_repo.find_by_id(startlist_id).await?;
        startlist.start_entries.push(entry_id);
        startlist.no_of_contestants += 1;
        startlists_repo.update(startlist_id, startlist).await?;

        let plans_repo = RaceplansRepository::new(db);
        if let Ok(mut raceplan) = plans_repo.find_by_id(race.raceplan_id).await {
            raceplan.no_of_contestants += 1;
            plans_repo.update(raceplan.id, raceplan).await?;
        }
    }

    Ok(entry_id)
}

pub async fn get_start_entry(db: &Database, race_id: Uuid, id: Uuid) -> WebResult<StartEntry> {
    let entry = StartEntriesRepository::new(db).find_by_id(id).await?;
    if entry.race_id != race_id {
        return Err(WebError::NotFound(format!(
            "Start-entry {id} not found in race {race_id}."
        )));
    }
    Ok(entry)
}

pub async fn update_start_entry(
    db: &Database,
    race_id: Uuid,
    id: Uuid,
    start_entry: StartEntry,
) -> WebResult<()> {
    get_start_entry(db, race_id, id).await?;
    StartEntriesService::update_start_entry(db, id, start_entry).await?;
    Ok(())
}

/// Remove a start-entry and detach it from its race, startlist and plan.
pub async fn delete_start_entry(db: &Database, race_id: Uuid, id: Uuid) -> WebResult<()> {
    let entry = get_start_entry(db, race_id, id).await?;

    StartEntriesService::delete_start_entry(db, id).await?;

    let races_repo = RacesRepository::new(db);
    let mut race = races_repo.find_by_id(race_id).await?;
    race.start_entries.retain(|&entry_id| entry_id != id);
    race.no_of_contestants = race.start_entries.len() as u32;
    races_repo.update(race_id, race.clone()).await?;

    if let Some(startlist_id) = entry.startlist_id {
        let startlists_repo = StartlistsRepository::new(db);
        if let Ok(mut startlist) = startlists_repo.find_by_id(startlist_id).await {
            startlist.start_entries.retain(|&entry_id| entry_id != id);
            startlist.no_of_contestants = startlist.no_of_contestants.saturating_sub(1);
            startlists_repo.update(startlist_id, startlist).await?;
        }

        let plans_repo = RaceplansRepository::new(db);
        if let Ok(mut raceplan) = plans_repo.find_by_id(race.raceplan_id).await {
            raceplan.no_of_contestants = raceplan.no_of_contestants.saturating_sub(1);
            plans_repo.update(raceplan.id, raceplan).await?;
        }
    }

    Ok(())
}
