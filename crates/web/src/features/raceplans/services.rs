use std::collections::BTreeMap;

use adapters::{CompetitionFormatsClient, EventsClient};
use storage::dto::raceplan::RaceplanDetailResponse;
use storage::error::StorageError;
use storage::models::{CompetitionFormat, FormatKind, Race};
use storage::repository::{
    RaceResultsRepository, RaceplansRepository, RacesRepository, StartEntriesRepository,
    StartlistsRepository,
};
use storage::services::raceclasses::validate_raceclasses;
use storage::services::raceplan_fixed_start::calculate_raceplan_fixed_start;
use storage::services::raceplan_individual_sprint::calculate_raceplan_individual_sprint;
use storage::services::raceplan_interval_start::calculate_raceplan_interval_start;
use storage::services::{RaceplansService, RacesService};
use storage::Database;
use uuid::Uuid;

use crate::error::WebResult;

/// Generate the raceplan for an event: fetch the event, its format and its
/// raceclasses, run the per-format calculation, and persist the plan with
/// every race as one logical unit.
pub async fn generate_raceplan_for_event(
    db: &Database,
    events: &EventsClient,
    formats: &CompetitionFormatsClient,
    token: &str,
    event_id: &str,
) -> WebResult<Uuid> {
    let _guard = db.lock(event_id).await;

    let existing = RaceplansRepository::new(db).find_by_event_id(event_id).await?;
    if !existing.is_empty() {
        return Err(StorageError::ConstraintViolation(format!(
            "Event \"{event_id}\" already has a raceplan."
        ))
        .into());
    }

    let event = events.get_event_by_id(token, event_id).await?;
    event.starting_time()?;
    let kind = FormatKind::from_name(&event.competition_format).ok_or_else(|| {
        StorageError::IllegalValue(format!(
            "Competition-format \"{}\" not supported.",
            event.competition_format
        ))
    })?;
    let competition_format = formats.get_by_name(token, &event.competition_format).await?;
    let raceclasses = events.get_raceclasses(token, event_id).await?;
    validate_raceclasses(event_id, &raceclasses)?;

    let (raceplan, races) = match kind {
        FormatKind::IntervalStart => {
            calculate_raceplan_interval_start(&event, &competition_format, &raceclasses)?
        }
        FormatKind::IndividualSprint => {
            calculate_raceplan_individual_sprint(&event, &competition_format, &raceclasses)?
        }
        FormatKind::MassStart
        | FormatKind::Skiathlon
        | FormatKind::Pursuit
        | FormatKind::TeamSprint
        | FormatKind::Relay => {
            calculate_raceplan_fixed_start(&event, &competition_format, &raceclasses)?
        }
    };

    let raceplan_id = RaceplansService::create_raceplan(db, raceplan).await?;
    let mut created: Vec<Uuid> = Vec::new();
    for race in races {
        match RacesService::create_race(db, race).await {
            Ok(race_id) => created.push(race_id),
            Err(err) => {
                rollback_raceplan(db, raceplan_id, &created).await;
                return Err(err.into());
            }
        }
    }

    tracing::info!(event_id, %raceplan_id, races = created.len(), "generated raceplan");
    Ok(raceplan_id)
}

/// Undo the partial writes of a failed generation.
async fn rollback_raceplan(db: &Database, raceplan_id: Uuid, race_ids: &[Uuid]) {
    let races = RacesRepository::new(db);
    for race_id in race_ids {
        if let Err(err) = races.delete(*race_id).await {
            tracing::error!(%race_id, error = %err, "rollback: could not delete race");
        }
    }
    if let Err(err) = RaceplansRepository::new(db).delete(raceplan_id).await {
        tracing::error!(%raceplan_id, error = %err, "rollback: could not delete raceplan");
    }
}

pub async fn get_raceplan_detail(db: &Database, id: Uuid) -> WebResult<RaceplanDetailResponse> {
    let raceplan = RaceplansRepository::new(db).find_by_id(id).await?;
    let races = RacesRepository::new(db).find_by_raceplan_id(id).await?;
    Ok(RaceplanDetailResponse::new(raceplan, races))
}

/// Delete the raceplan and everything hanging off it: races, their
/// start-entries and race-results, and the event startlist when this was
/// the last plan.
pub async fn delete_raceplan(db: &Database, id: Uuid) -> WebResult<()> {
    let raceplan = RaceplansRepository::new(db).find_by_id(id).await?;
    let _guard = db.lock(&raceplan.event_id).await;

    let races_repo = RacesRepository::new(db);
    let se_repo = StartEntriesRepository::new(db);
    let rr_repo = RaceResultsRepository::new(db);
    for race in races_repo.find_by_raceplan_id(id).await? {
        for entry in se_repo.find_by_race_id(race.id).await? {
            se_repo.delete(entry.id).await?;
        }
        for result in rr_repo.find_by_race_id(race.id).await? {
            rr_repo.delete(result.id).await?;
        }
        races_repo.delete(race.id).await?;
    }
    RaceplansService::delete_raceplan(db, id).await?;

    let remaining = RaceplansRepository::new(db)
        .find_by_event_id(&raceplan.event_id)
        .await?;
    if remaining.is_empty() {
        let startlists_repo = StartlistsRepository::new(db);
        for startlist in startlists_repo.find_by_event_id(&raceplan.event_id).await? {
            for entry in se_repo.find_by_startlist_id(startlist.id).await? {
                se_repo.delete(entry.id).await?;
            }
            startlists_repo.delete(startlist.id).await?;
        }
    }
    Ok(())
}

/// Check an existing raceplan against its event and raceclasses. Findings
/// are grouped per race order; key 0 holds plan-level findings.
pub async fn validate_raceplan(
    db: &Database,
    events: &EventsClient,
    formats: &CompetitionFormatsClient,
    token: &str,
    id: Uuid,
) -> WebResult<BTreeMap<u32, Vec<String>>> {
    let raceplan = RaceplansRepository::new(db).find_by_id(id).await?;
    let event = events.get_event_by_id(token, &raceplan.event_id).await?;
    let competition_format = formats.get_by_name(token, &event.competition_format).await?;
    let raceclasses = events.get_raceclasses(token, &raceplan.event_id).await?;
    let races = RacesRepository::new(db).find_by_raceplan_id(id).await?;

    let mut results: BTreeMap<u32, Vec<String>> = BTreeMap::new();

    for pair in races.windows(2) {
        if pair[0].start_time >= pair[1].start_time {
            results
                .entry(pair[1].order)
                .or_default()
                .push("Start time is not in chronological order.".to_string());
        }
    }

    let mut sum_no_of_contestants = 0;
    for race in &races {
        if race.no_of_contestants == 0 {
            results
                .entry(race.order)
                .or_default()
                .push("Race has no contestants.".to_string());
        }
        if counts_toward_total(race, &competition_format) {
            sum_no_of_contestants += race.no_of_contestants;
        }
    }

    if sum_no_of_contestants != raceplan.no_of_contestants {
        results.entry(0).or_default().push(format!(
            "The sum of contestants in races ({sum_no_of_contestants}) is not equal to \
             the number of contestants in the raceplan ({}).",
            raceplan.no_of_contestants
        ));
    }

    let in_raceclasses: u32 = raceclasses.iter().map(|r| r.no_of_contestants).sum();
    if raceplan.no_of_contestants != in_raceclasses {
        results.entry(0).or_default().push(format!(
            "Number of contestants in raceplan ({}) is not equal to the number of \
             contestants in the raceclasses ({in_raceclasses}).",
            raceplan.no_of_contestants
        ));
    }

    Ok(results)
}

/// Only first-round races count toward the plan total; every race of a
/// non-bracket plan is a first round.
fn counts_toward_total(race: &Race, competition_format: &CompetitionFormat) -> bool {
    match race.round() {
        None => true,
        Some(round) => {
            let ranked_first = competition_format
                .rounds_ranked_classes
                .as_ref()
                .and_then(|rounds| rounds.first());
            let non_ranked_first = competition_format
                .rounds_non_ranked_classes
                .as_ref()
                .and_then(|rounds| rounds.first());
            Some(&round.to_string()) == ranked_first || Some(&round.to_string()) == non_ranked_first
        }
    }
}
