use std::collections::BTreeMap;
use std::collections::HashSet;

use adapters::{CompetitionFormatsClient, EventsClient};
use storage::dto::startlist::StartlistDetailResponse;
use storage::error::StorageError;
use storage::models::{Contestant, FormatKind, Race, Startlist};
use storage::repository::{
    RaceplansRepository, RacesRepository, StartEntriesRepository, StartlistsRepository,
};
use storage::services::raceclasses::validate_raceclasses;
use storage::services::startlist_entries::{
    seed_start_entries_individual_sprint, seed_start_entries_interval_start,
    seed_start_entries_mass_start,
};
use storage::services::{StartEntriesService, StartlistsService};
use storage::Database;
use uuid::Uuid;

use crate::error::WebResult;

/// Generate the startlist for an event: seed every first-round race from
/// the contestant roster and persist the startlist with all entries as one
/// logical unit.
pub async fn generate_startlist_for_event(
    db: &Database,
    events: &EventsClient,
    formats: &CompetitionFormatsClient,
    token: &str,
    event_id: &str,
) -> WebResult<Uuid> {
    let _guard = db.lock(event_id).await;

    let existing = StartlistsRepository::new(db).find_by_event_id(event_id).await?;
    if !existing.is_empty() {
        return Err(StorageError::ConstraintViolation(format!(
            "Event \"{event_id}\" already has a startlist."
        ))
        .into());
    }

    let event = events.get_event_by_id(token, event_id).await?;
    let kind = FormatKind::from_name(&event.competition_format).ok_or_else(|| {
        StorageError::IllegalValue(format!(
            "Competition-format \"{}\" not supported.",
            event.competition_format
        ))
    })?;
    let competition_format = formats.get_by_name(token, &event.competition_format).await?;
    let raceclasses = events.get_raceclasses(token, event_id).await?;
    validate_raceclasses(event_id, &raceclasses)?;

    let raceplans = RaceplansRepository::new(db).find_by_event_id(event_id).await?;
    let raceplan = match raceplans.len() {
        0 => {
            return Err(StorageError::IllegalValue(format!(
                "No raceplan for event {event_id}. Cannot proceed."
            ))
            .into())
        }
        1 => raceplans.into_iter().next().expect("one raceplan"),
        _ => {
            return Err(StorageError::ConstraintViolation(format!(
                "Multiple raceplans for event {event_id}. Cannot proceed."
            ))
            .into())
        }
    };
    let races = RacesRepository::new(db).find_by_raceplan_id(raceplan.id).await?;
    if races.is_empty() {
        return Err(StorageError::IllegalValue(format!(
            "No races in raceplan {}. Cannot proceed.",
            raceplan.id
        ))
        .into());
    }

    let contestants = events.get_contestants(token, event_id).await?;
    validate_contestants(event_id, &contestants)?;
    let in_raceclasses: u32 = raceclasses.iter().map(|r| r.no_of_contestants).sum();
    if contestants.len() as u32 != in_raceclasses {
        return Err(StorageError::IllegalValue(format!(
            "Number of contestants does not match raceclasses: {} != {in_raceclasses}.",
            contestants.len()
        ))
        .into());
    }
    if contestants.len() as u32 != raceplan.no_of_contestants {
        return Err(StorageError::IllegalValue(format!(
            "Number of contestants does not match raceplan: {} != {}.",
            contestants.len(),
            raceplan.no_of_contestants
        ))
        .into());
    }

    let startlist = Startlist {
        id: Uuid::new_v4(),
        event_id: event_id.to_string(),
        no_of_contestants: contestants.len() as u32,
        start_entries: Vec::new(),
    };
    let startlist_id = StartlistsService::create_startlist(db, startlist).await?;

    let seeded = match kind {
        FormatKind::IntervalStart => seed_start_entries_interval_start(
            &competition_format,
            &raceclasses,
            &races,
            &contestants,
            startlist_id,
        ),
        FormatKind::IndividualSprint => seed_start_entries_individual_sprint(
            &competition_format,
            &raceclasses,
            &races,
            &contestants,
            startlist_id,
        ),
        FormatKind::MassStart
        | FormatKind::Skiathlon
        | FormatKind::Pursuit
        | FormatKind::TeamSprint
        | FormatKind::Relay => {
            seed_start_entries_mass_start(&raceclasses, &races, &contestants, startlist_id)
        }
    };
    let start_entries = match seeded {
        Ok(entries) => entries,
        Err(err) => {
            let _ = StartlistsRepository::new(db).delete(startlist_id).await;
            return Err(err.into());
        }
    };

    // Journaled write: created entries and pre-image of every touched race.
    let races_repo = RacesRepository::new(db);
    let mut created: Vec<Uuid> = Vec::new();
    let mut race_snapshots: BTreeMap<Uuid, Race> = BTreeMap::new();
    for entry in start_entries {
        let race_id = entry.race_id;
        let entry_id = match StartEntriesService::create_start_entry(db, entry).await {
            Ok(id) => id,
            Err(err) => {
                rollback_startlist(db, startlist_id, &created, &race_snapshots).await;
                return Err(err.into());
            }
        };
        created.push(entry_id);

        let mut race = races_repo.find_by_id(race_id).await?;
        race_snapshots.entry(race_id).or_insert_with(|| race.clone());
        race.start_entries.push(entry_id);
        race.no_of_contestants = race.start_entries.len() as u32;
        if let Err(err) = races_repo.update(race_id, race).await {
            rollback_startlist(db, startlist_id, &created, &race_snapshots).await;
            return Err(err.into());
        }
    }

    let mut startlist = StartlistsRepository::new(db).find_by_id(startlist_id).await?;
    startlist.start_entries = created.clone();
    StartlistsRepository::new(db)
        .update(startlist_id, startlist)
        .await?;

    tracing::info!(event_id, %startlist_id, entries = created.len(), "generated startlist");
    Ok(startlist_id)
}

async fn rollback_startlist(
    db: &Database,
    startlist_id: Uuid,
    entry_ids: &[Uuid],
    race_snapshots: &BTreeMap<Uuid, Race>,
) {
    let se_repo = StartEntriesRepository::new(db);
    for entry_id in entry_ids {
        if let Err(err) = se_repo.delete(*entry_id).await {
            tracing::error!(%entry_id, error = %err, "rollback: could not delete start-entry");
        }
    }
    let races_repo = RacesRepository::new(db);
    for (race_id, snapshot) in race_snapshots {
        if let Err(err) = races_repo.update(*race_id, snapshot.clone()).await {
            tracing::error!(%race_id, error = %err, "rollback: could not restore race");
        }
    }
    if let Err(err) = StartlistsRepository::new(db).delete(startlist_id).await {
        tracing::error!(%startlist_id, error = %err, "rollback: could not delete startlist");
    }
}

pub async fn get_startlist_detail(db: &Database, id: Uuid) -> WebResult<StartlistDetailResponse> {
    let startlist = StartlistsRepository::new(db).find_by_id(id).await?;
    let start_entries = StartEntriesRepository::new(db)
        .find_by_startlist_id(id)
        .await?;
    Ok(StartlistDetailResponse::new(startlist, start_entries))
}

/// Delete a startlist and its entries, detaching them from their races.
pub async fn delete_startlist(db: &Database, id: Uuid) -> WebResult<()> {
    let startlist = StartlistsRepository::new(db).find_by_id(id).await?;
    let _guard = db.lock(&startlist.event_id).await;

    let se_repo = StartEntriesRepository::new(db);
    let races_repo = RacesRepository::new(db);
    for entry in se_repo.find_by_startlist_id(id).await? {
        se_repo.delete(entry.id).await?;
        if let Ok(mut race) = races_repo.find_by_id(entry.race_id).await {
            race.start_entries.retain(|&entry_id| entry_id != entry.id);
            race.no_of_contestants = race.start_entries.len() as u32;
            races_repo.update(race.id, race).await?;
        }
    }
    StartlistsService::delete_startlist(db, id).await?;
    Ok(())
}

fn validate_contestants(event_id: &str, contestants: &[Contestant]) -> WebResult<()> {
    if contestants.is_empty() {
        return Err(StorageError::IllegalValue(format!(
            "No contestants found for event {event_id}."
        ))
        .into());
    }
    let mut bibs: HashSet<u32> = HashSet::new();
    for contestant in contestants {
        let bib = contestant.bib.ok_or_else(|| {
            StorageError::IllegalValue(format!(
                "Contestant {} has no bib assigned.",
                contestant.full_name()
            ))
        })?;
        if !bibs.insert(bib) {
            return Err(StorageError::IllegalValue(format!(
                "Contestants bib values for event {event_id} are not unique."
            ))
            .into());
        }
    }
    Ok(())
}
