//! Time-event ingestion: per-timing-point race results, ranking, and
//! qualifier propagation through the sprint bracket.

use std::collections::{BTreeMap, HashSet, VecDeque};

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Changelog, Race, RaceResult, RuleQuota, StartEntry, StartEntryStatus, TimeEvent,
    TimeEventStatus,
};
use crate::repository::{
    RaceResultsRepository, RacesRepository, StartEntriesRepository, TimeEventsRepository,
};
use crate::store::Database;

use super::raceplan_individual_sprint::ordered_rule_entries;
use super::time_events::TimeEventsService;

pub const TIMING_POINT_START: &str = "Start";
pub const TIMING_POINT_FINISH: &str = "Finish";
pub const TIMING_POINT_TEMPLATE: &str = "Template";

pub struct RaceResultsService;

impl RaceResultsService {
    /// Create the time-event and fold it into the race-result of its
    /// `(race, timing-point)` pair: insert into the ranking sequence,
    /// re-rank, and propagate qualifiers when a sprint heat completes.
    ///
    /// Processing failures do not lose the observation: the event is kept
    /// with `status="Error"` and a changelog entry naming the cause, and the
    /// stored document is returned. Only a duplicate observation is rejected
    /// outright.
    pub async fn create_and_process_time_event(
        db: &Database,
        time_event: TimeEvent,
    ) -> Result<TimeEvent> {
        let race_id = time_event.race_id;
        let timing_point = time_event.timing_point.clone();
        let id = TimeEventsService::create_time_event(db, time_event).await?;

        let outcome = match race_id {
            Some(race_id) => {
                let _guard = db.lock(&pair_key(race_id, &timing_point)).await;
                process(db, race_id, id).await
            }
            None => Err(StorageError::IllegalValue(format!(
                "Time-event {id} does not have race reference."
            ))),
        };

        let repo = TimeEventsRepository::new(db);
        match outcome {
            Ok(()) => repo.find_by_id(id).await,
            Err(err) => {
                let mut stored = repo.find_by_id(id).await?;
                stored.status = TimeEventStatus::Error;
                stored.rank = None;
                stored
                    .changelog
                    .push(Changelog::new("system", err.to_string()));
                repo.update(id, stored.clone()).await?;
                tracing::warn!(time_event = %id, error = %err, "time-event stored with status Error");
                Ok(stored)
            }
        }
    }

    /// Delete a time-event and undo its traces: the ranking sequence is
    /// re-ranked, and a start-entry it propagated is removed again - unless
    /// the downstream race already has time-events for that contestant.
    pub async fn delete_time_event(db: &Database, id: Uuid) -> Result<()> {
        let te_repo = TimeEventsRepository::new(db);
        let time_event = te_repo.find_by_id(id).await?;

        if let Some(race_id) = time_event.race_id {
            let _guard = db.lock(&pair_key(race_id, &time_event.timing_point)).await;

            if let (Some(next_race_id), Some(bib)) = (time_event.next_race_id, time_event.bib) {
                remove_derived_entry(db, id, next_race_id, bib).await?;
            }

            withdraw_from_sequence(db, race_id, &time_event.timing_point, id).await?;
        }

        TimeEventsService::delete_time_event(db, id).await
    }

    pub async fn update_race_result(db: &Database, id: Uuid, race_result: RaceResult) -> Result<()> {
        let repo = RaceResultsRepository::new(db);
        let old = repo.find_by_id(id).await?;
        if race_result.id != old.id {
            return Err(StorageError::IllegalValue(
                "Cannot change id for race_result.".to_string(),
            ));
        }
        repo.update(id, race_result).await
    }

    pub async fn delete_race_result(db: &Database, id: Uuid) -> Result<()> {
        let repo = RaceResultsRepository::new(db);
        repo.find_by_id(id).await?;
        repo.delete(id).await
    }
}

fn pair_key(race_id: Uuid, timing_point: &str) -> String {
    format!("{race_id}/{timing_point}")
}

fn allowed_timing_points(race: &Race) -> &'static [&'static str] {
    if race.is_sprint() {
        &[TIMING_POINT_START, TIMING_POINT_FINISH, TIMING_POINT_TEMPLATE]
    } else {
        &[TIMING_POINT_START, TIMING_POINT_FINISH]
    }
}

async fn process(db: &Database, race_id: Uuid, time_event_id: Uuid) -> Result<()> {
    let races_repo = RacesRepository::new(db);
    let te_repo = TimeEventsRepository::new(db);

    let mut race = races_repo
        .find_by_id(race_id)
        .await
        .map_err(|_| StorageError::IllegalValue(format!("Race {race_id} not found.")))?;
    let time_event = te_repo.find_by_id(time_event_id).await?;

    if !allowed_timing_points(&race).contains(&time_event.timing_point.as_str()) {
        return Err(StorageError::IllegalValue(format!(
            "Timing-point \"{}\" is not valid for this race.",
            time_event.timing_point
        )));
    }

    let se_repo = StartEntriesRepository::new(db);
    let start_entries = se_repo.find_by_race_id(race_id).await?;
    if time_event.timing_point != TIMING_POINT_TEMPLATE {
        let bib = time_event.bib.ok_or_else(|| {
            StorageError::IllegalValue("Time-event has no bib. Cannot proceed.".to_string())
        })?;
        if !start_entries.iter().any(|entry| entry.bib == bib) {
            return Err(StorageError::IllegalValue(format!(
                "Contestant with bib {bib} is not in race start-entries."
            )));
        }
    }

    let rr_repo = RaceResultsRepository::new(db);
    let mut race_result = match rr_repo
        .find_by_race_id_and_timing_point(race_id, &time_event.timing_point)
        .await?
    {
        Some(result) => result,
        None => {
            let result = RaceResult {
                id: Uuid::new_v4(),
                race_id,
                timing_point: time_event.timing_point.clone(),
                no_of_contestants: 0,
                ranking_sequence: Vec::new(),
            };
            rr_repo.create(result.clone()).await?;
            result
        }
    };

    if !race_result.ranking_sequence.contains(&time_event_id) {
        if time_event.timing_point == TIMING_POINT_FINISH {
            let at = finish_insertion_index(db, &race_result, &time_event).await?;
            race_result.ranking_sequence.insert(at, time_event_id);
        } else {
            race_result.ranking_sequence.push(time_event_id);
        }
        race_result.no_of_contestants = race_result.ranking_sequence.len() as u32;
        rr_repo.update(race_result.id, race_result.clone()).await?;
    }

    if !race.results.contains_key(&time_event.timing_point) {
        race.results
            .insert(time_event.timing_point.clone(), race_result.id);
        races_repo.update(race.id, race.clone()).await?;
    }

    rerank(db, &race_result).await?;

    if race.is_sprint() && time_event.timing_point == TIMING_POINT_FINISH {
        if let Err(err) = propagate_if_complete(db, &race, &race_result, &start_entries).await {
            // A failed observation must not stay ranked.
            withdraw_from_sequence(db, race_id, &time_event.timing_point, time_event_id).await?;
            return Err(err);
        }
    }

    Ok(())
}

async fn withdraw_from_sequence(
    db: &Database,
    race_id: Uuid,
    timing_point: &str,
    time_event_id: Uuid,
) -> Result<()> {
    let rr_repo = RaceResultsRepository::new(db);
    if let Some(mut race_result) = rr_repo
        .find_by_race_id_and_timing_point(race_id, timing_point)
        .await?
    {
        if race_result.ranking_sequence.contains(&time_event_id) {
            race_result.ranking_sequence.retain(|&id| id != time_event_id);
            race_result.no_of_contestants = race_result.ranking_sequence.len() as u32;
            rr_repo.update(race_result.id, race_result.clone()).await?;
            rerank(db, &race_result).await?;
        }
    }
    Ok(())
}

/// Finish events rank on time; ties break on earlier registration, then on
/// bib ascending.
async fn finish_insertion_index(
    db: &Database,
    race_result: &RaceResult,
    time_event: &TimeEvent,
) -> Result<usize> {
    let te_repo = TimeEventsRepository::new(db);
    let key = (time_event.registration_time, time_event.bib);
    for (i, id) in race_result.ranking_sequence.iter().enumerate() {
        let existing = te_repo.find_by_id(*id).await?;
        if (existing.registration_time, existing.bib) > key {
            return Ok(i);
        }
    }
    Ok(race_result.ranking_sequence.len())
}

async fn rerank(db: &Database, race_result: &RaceResult) -> Result<()> {
    let te_repo = TimeEventsRepository::new(db);
    for (i, id) in race_result.ranking_sequence.iter().enumerate() {
        let mut time_event = te_repo.find_by_id(*id).await?;
        let rank = i as u32 + 1;
        if time_event.rank != Some(rank) {
            time_event.rank = Some(rank);
            te_repo.update(*id, time_event).await?;
        }
    }
    Ok(())
}

/// A contestant qualified out of a finished heat into a later race.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    pub time_event_id: Uuid,
    pub bib: u32,
    pub name: String,
    pub club: String,
    pub target_race_id: Uuid,
    pub target_label: String,
    pub target_start_time: NaiveDateTime,
    pub starting_position: u32,
}

/// When the last finish of a heat has arrived (OK finishes plus DNS/DNF/DSQ
/// entries cover the whole field), apply the heat's progression rule.
async fn propagate_if_complete(
    db: &Database,
    race: &Race,
    race_result: &RaceResult,
    start_entries: &[StartEntry],
) -> Result<()> {
    if race.no_of_contestants == 0 {
        return Ok(());
    }
    let te_repo = TimeEventsRepository::new(db);
    let mut finishers: Vec<TimeEvent> = Vec::with_capacity(race_result.ranking_sequence.len());
    for id in &race_result.ranking_sequence {
        finishers.push(te_repo.find_by_id(*id).await?);
    }

    let finish_bibs: HashSet<u32> = finishers.iter().filter_map(|te| te.bib).collect();
    let out_bibs: HashSet<u32> = start_entries
        .iter()
        .filter(|entry| entry.status.is_out())
        .map(|entry| entry.bib)
        .collect();
    let missing = out_bibs.difference(&finish_bibs).count();
    if finishers.len() + missing < race.no_of_contestants as usize {
        return Ok(());
    }

    // DNS/DNF/DSQ never progress, whatever the clock said.
    let ranked: Vec<&TimeEvent> = finishers
        .iter()
        .filter(|te| te.bib.is_some_and(|bib| !out_bibs.contains(&bib)))
        .collect();

    let races_repo = RacesRepository::new(db);
    let class_races = races_repo
        .find_by_event_id_and_raceclass(&race.event_id, &race.raceclass)
        .await?;
    let qualifiers = partition_qualifiers(race, &ranked, &class_races)?;

    let se_repo = StartEntriesRepository::new(db);

    // Check every target has room before writing anything.
    let mut staged: BTreeMap<Uuid, u32> = BTreeMap::new();
    for qualifier in &qualifiers {
        let exists = se_repo
            .find_by_race_id_and_bib(qualifier.target_race_id, qualifier.bib)
            .await?
            .is_some();
        if !exists {
            *staged.entry(qualifier.target_race_id).or_insert(0) += 1;
        }
    }
    for (target_race_id, new_entries) in &staged {
        let target = races_repo.find_by_id(*target_race_id).await?;
        let existing = se_repo.find_by_race_id(*target_race_id).await?.len() as u32;
        if existing + new_entries > target.max_no_of_contestants {
            return Err(StorageError::ConstraintViolation(format!(
                "Race {} cannot hold more than {} contestants.",
                target.id, target.max_no_of_contestants
            )));
        }
    }

    for qualifier in qualifiers {
        match se_repo
            .find_by_race_id_and_bib(qualifier.target_race_id, qualifier.bib)
            .await?
        {
            Some(mut entry) => {
                entry.starting_position = qualifier.starting_position;
                se_repo.update(entry.id, entry).await?;
            }
            None => {
                let entry = StartEntry {
                    id: Uuid::new_v4(),
                    race_id: qualifier.target_race_id,
                    startlist_id: None,
                    bib: qualifier.bib,
                    name: qualifier.name.clone(),
                    club: qualifier.club.clone(),
                    starting_position: qualifier.starting_position,
                    scheduled_start_time: qualifier.target_start_time,
                    actual_start_time: None,
                    status: StartEntryStatus::None,
                    changelog: vec![Changelog::new(
                        "system",
                        format!("PROPAGATED_FROM:{}", race.id),
                    )],
                };
                let entry_id = se_repo.create(entry).await?;
                let mut target = races_repo.find_by_id(qualifier.target_race_id).await?;
                target.start_entries.push(entry_id);
                target.no_of_contestants = target.start_entries.len() as u32;
                races_repo.update(target.id, target).await?;
            }
        }

        let mut time_event = te_repo.find_by_id(qualifier.time_event_id).await?;
        time_event.next_race = Some(qualifier.target_label.clone());
        time_event.next_race_id = Some(qualifier.target_race_id);
        time_event.next_race_position = Some(qualifier.starting_position);
        te_repo.update(time_event.id, time_event).await?;
    }

    Ok(())
}

/// Pure partition of a finished heat's ranked contestants into its target
/// races. Targets with several heats are fed round-robin by source heat;
/// starting positions are blocked per source heat so that they come out
/// dense once every feeder heat has finished.
pub fn partition_qualifiers(
    race: &Race,
    ranked: &[&TimeEvent],
    class_races: &[Race],
) -> Result<Vec<Qualifier>> {
    let Some(rule) = race.rule() else {
        return Ok(Vec::new());
    };
    let source_heat = race.heat().unwrap_or(1);
    let rounds = rounds_in_running_order(class_races);

    let counted_total: u32 = rule
        .values()
        .flat_map(|by_index| by_index.values())
        .filter_map(|quota| match quota {
            RuleQuota::Count(count) => Some(*count),
            RuleQuota::Keyword(_) => None,
        })
        .sum();
    let planned_leftover = race.no_of_contestants.saturating_sub(counted_total);

    let mut queue: VecDeque<&TimeEvent> = ranked.iter().copied().collect();
    let mut qualifiers: Vec<Qualifier> = Vec::new();

    for (to_round, to_index, quota) in ordered_rule_entries(rule, &rounds) {
        let mut targets: Vec<&Race> = class_races
            .iter()
            .filter(|candidate| {
                candidate.round() == Some(to_round.as_str())
                    && candidate.index() == Some(to_index.as_str())
            })
            .collect();
        targets.sort_by_key(|candidate| candidate.heat());
        let Some(&target) = targets.get(((source_heat - 1) as usize) % targets.len().max(1))
        else {
            continue;
        };
        let heat_count = targets.len() as u32;
        let block = (source_heat - 1) / heat_count;

        let quota_size = match quota {
            RuleQuota::Count(count) => count,
            RuleQuota::Keyword(_) => planned_leftover,
        };
        for i in 1..=quota_size {
            let Some(time_event) = queue.pop_front() else {
                break;
            };
            let (Some(bib), name, club) = (time_event.bib, &time_event.name, &time_event.club)
            else {
                continue;
            };
            qualifiers.push(Qualifier {
                time_event_id: time_event.id,
                bib,
                name: name.clone().unwrap_or_default(),
                club: club.clone().unwrap_or_default(),
                target_race_id: target.id,
                target_label: format!(
                    "{}{}{}",
                    to_round,
                    to_index,
                    target.heat().unwrap_or(0)
                ),
                target_start_time: target.start_time,
                starting_position: block * quota_size + i,
            });
        }
    }

    Ok(qualifiers)
}

fn rounds_in_running_order(class_races: &[Race]) -> Vec<String> {
    let mut ordered: Vec<(u32, String)> = Vec::new();
    for race in class_races {
        if let Some(round) = race.round() {
            if !ordered.iter().any(|(_, seen)| seen.as_str() == round) {
                ordered.push((race.order, round.to_string()));
            }
        }
    }
    ordered.sort_by_key(|(order, _)| *order);
    ordered.into_iter().map(|(_, round)| round).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDateTime;

    use super::*;
    use crate::models::{RaceVariant, Rule};
    use crate::repository::RaceResultsRepository;

    fn at(clock: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2021-09-29 {clock}"), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn race(raceclass: &str, order: u32, n: u32, max: u32, variant: RaceVariant) -> Race {
        Race {
            id: Uuid::new_v4(),
            raceclass: raceclass.to_string(),
            order,
            start_time: at("09:30:00"),
            max_no_of_contestants: max,
            no_of_contestants: n,
            event_id: "event-1".to_string(),
            raceplan_id: Uuid::new_v4(),
            start_entries: Vec::new(),
            results: BTreeMap::new(),
            variant,
        }
    }

    fn sprint_variant(round: &str, heat: u32, rule_entries: &[(&str, &str, RuleQuota)]) -> RaceVariant {
        let mut rule = Rule::new();
        for (to_round, to_index, quota) in rule_entries {
            rule.entry((*to_round).to_string())
                .or_default()
                .insert((*to_index).to_string(), *quota);
        }
        RaceVariant::IndividualSprint {
            round: round.to_string(),
            index: String::new(),
            heat,
            rule,
        }
    }

    async fn add_entries(db: &Database, race: &mut Race, bibs: &[u32]) {
        let repo = StartEntriesRepository::new(db);
        for (i, bib) in bibs.iter().enumerate() {
            let entry = StartEntry {
                id: Uuid::new_v4(),
                race_id: race.id,
                startlist_id: None,
                bib: *bib,
                name: format!("Runner {bib}"),
                club: "Lyn Ski".to_string(),
                starting_position: i as u32 + 1,
                scheduled_start_time: race.start_time,
                actual_start_time: None,
                status: StartEntryStatus::None,
                changelog: Vec::new(),
            };
            race.start_entries.push(entry.id);
            repo.create(entry).await.unwrap();
        }
        RacesRepository::new(db).update(race.id, race.clone()).await.unwrap();
    }

    fn finish(race: &Race, bib: u32, clock: &str) -> TimeEvent {
        TimeEvent {
            id: Uuid::new_v4(),
            event_id: race.event_id.clone(),
            race_id: Some(race.id),
            race: Some(race.raceclass.clone()),
            bib: Some(bib),
            name: Some(format!("Runner {bib}")),
            club: Some("Lyn Ski".to_string()),
            timing_point: TIMING_POINT_FINISH.to_string(),
            registration_time: at(clock),
            rank: None,
            next_race: None,
            next_race_id: None,
            next_race_position: None,
            status: TimeEventStatus::Ok,
            changelog: Vec::new(),
        }
    }

    async fn sequence_bibs(db: &Database, race_id: Uuid, timing_point: &str) -> Vec<u32> {
        let result = RaceResultsRepository::new(db)
            .find_by_race_id_and_timing_point(race_id, timing_point)
            .await
            .unwrap()
            .unwrap();
        let te_repo = TimeEventsRepository::new(db);
        let mut bibs = Vec::new();
        for id in result.ranking_sequence {
            bibs.push(te_repo.find_by_id(id).await.unwrap().bib.unwrap());
        }
        bibs
    }

    #[tokio::test]
    async fn finish_events_rank_on_time_with_bib_tiebreak() {
        let db = Database::new();
        let mut race = race("G16", 1, 3, 10, RaceVariant::IntervalStart);
        RacesRepository::new(&db).create(race.clone()).await.unwrap();
        add_entries(&db, &mut race, &[1, 2, 3]).await;

        RaceResultsService::create_and_process_time_event(&db, finish(&race, 2, "09:41:10"))
            .await
            .unwrap();
        RaceResultsService::create_and_process_time_event(&db, finish(&race, 1, "09:40:30"))
            .await
            .unwrap();
        // Same clock as bib 2: bib ascending breaks the tie.
        RaceResultsService::create_and_process_time_event(&db, finish(&race, 3, "09:41:10"))
            .await
            .unwrap();

        assert_eq!(
            sequence_bibs(&db, race.id, TIMING_POINT_FINISH).await,
            vec![1, 2, 3]
        );
        let events = TimeEventsRepository::new(&db)
            .find_by_race_id_and_timing_point(race.id, TIMING_POINT_FINISH)
            .await
            .unwrap();
        for event in events {
            let expected = match event.bib.unwrap() {
                1 => 1,
                2 => 2,
                _ => 3,
            };
            assert_eq!(event.rank, Some(expected));
        }
    }

    #[tokio::test]
    async fn start_events_keep_arrival_order() {
        let db = Database::new();
        let mut race = race("G16", 1, 2, 10, RaceVariant::IntervalStart);
        RacesRepository::new(&db).create(race.clone()).await.unwrap();
        add_entries(&db, &mut race, &[1, 2]).await;

        let mut second_first = finish(&race, 2, "09:31:00");
        second_first.timing_point = TIMING_POINT_START.to_string();
        let mut first_last = finish(&race, 1, "09:30:00");
        first_last.timing_point = TIMING_POINT_START.to_string();
        RaceResultsService::create_and_process_time_event(&db, second_first)
            .await
            .unwrap();
        RaceResultsService::create_and_process_time_event(&db, first_last)
            .await
            .unwrap();

        assert_eq!(
            sequence_bibs(&db, race.id, TIMING_POINT_START).await,
            vec![2, 1]
        );
    }

    #[tokio::test]
    async fn unknown_timing_point_is_stored_with_error_status() {
        let db = Database::new();
        let mut race = race("G16", 1, 1, 10, RaceVariant::IntervalStart);
        RacesRepository::new(&db).create(race.clone()).await.unwrap();
        add_entries(&db, &mut race, &[1]).await;

        let mut event = finish(&race, 1, "09:40:00");
        event.timing_point = "Halfway".to_string();
        let stored = RaceResultsService::create_and_process_time_event(&db, event)
            .await
            .unwrap();

        assert_eq!(stored.status, TimeEventStatus::Error);
        assert!(stored.changelog.last().unwrap().comment.contains("Halfway"));
        assert!(RaceResultsRepository::new(&db)
            .find_by_race_id_and_timing_point(race.id, "Halfway")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn bib_outside_start_entries_is_stored_with_error_status() {
        let db = Database::new();
        let mut race = race("G16", 1, 1, 10, RaceVariant::IntervalStart);
        RacesRepository::new(&db).create(race.clone()).await.unwrap();
        add_entries(&db, &mut race, &[1]).await;

        let stored =
            RaceResultsService::create_and_process_time_event(&db, finish(&race, 99, "09:40:00"))
                .await
                .unwrap();

        assert_eq!(stored.status, TimeEventStatus::Error);
    }

    #[tokio::test]
    async fn duplicate_observation_is_a_conflict() {
        let db = Database::new();
        let mut race = race("G16", 1, 2, 10, RaceVariant::IntervalStart);
        RacesRepository::new(&db).create(race.clone()).await.unwrap();
        add_entries(&db, &mut race, &[1, 2]).await;

        RaceResultsService::create_and_process_time_event(&db, finish(&race, 1, "09:40:00"))
            .await
            .unwrap();
        let second = RaceResultsService::create_and_process_time_event(
            &db,
            finish(&race, 1, "09:40:05"),
        )
        .await;

        assert!(matches!(
            second,
            Err(StorageError::ConstraintViolation(_))
        ));
    }

    /// Two semifinal heats feeding final A (top 2 each) and final B (rest).
    async fn bracket(db: &Database) -> (Race, Race, Race, Race) {
        let races_repo = RacesRepository::new(db);
        let rule: &[(&str, &str, RuleQuota)] = &[
            ("F", "A", RuleQuota::Count(2)),
            ("F", "B", RuleQuota::Keyword(crate::models::RuleKeyword::Rest)),
        ];
        let mut s1 = race("G16", 1, 4, 10, sprint_variant("S", 1, rule));
        let mut s2 = race("G16", 2, 4, 10, sprint_variant("S", 2, rule));
        let mut fb = race("G16", 3, 4, 10, sprint_variant("F", 1, &[]));
        let mut fa = race("G16", 4, 4, 10, sprint_variant("F", 1, &[]));
        if let RaceVariant::IndividualSprint { index, .. } = &mut fb.variant {
            *index = "B".to_string();
        }
        if let RaceVariant::IndividualSprint { index, .. } = &mut fa.variant {
            *index = "A".to_string();
        }
        fa.no_of_contestants = 0;
        fb.no_of_contestants = 0;
        for race in [&s1, &s2, &fa, &fb] {
            races_repo.create((*race).clone()).await.unwrap();
        }
        add_entries(db, &mut s1, &[1, 2, 3, 4]).await;
        add_entries(db, &mut s2, &[5, 6, 7, 8]).await;
        (s1, s2, fa, fb)
    }

    #[tokio::test]
    async fn completed_heat_propagates_qualifiers() {
        let db = Database::new();
        let (s1, _s2, fa, fb) = bracket(&db).await;

        for (bib, clock) in [(3, "09:40:01"), (1, "09:40:02"), (4, "09:40:03"), (2, "09:40:04")] {
            RaceResultsService::create_and_process_time_event(&db, finish(&s1, bib, clock))
                .await
                .unwrap();
        }

        let se_repo = StartEntriesRepository::new(&db);
        let fa_entries = se_repo.find_by_race_id(fa.id).await.unwrap();
        let fb_entries = se_repo.find_by_race_id(fb.id).await.unwrap();
        assert_eq!(
            fa_entries.iter().map(|e| (e.bib, e.starting_position)).collect::<Vec<_>>(),
            vec![(3, 1), (1, 2)]
        );
        assert_eq!(
            fb_entries.iter().map(|e| (e.bib, e.starting_position)).collect::<Vec<_>>(),
            vec![(4, 1), (2, 2)]
        );
        assert!(fa_entries[0]
            .changelog
            .last()
            .unwrap()
            .comment
            .contains(&format!("PROPAGATED_FROM:{}", s1.id)));

        // The finish events point at the race they qualified into.
        let winner = TimeEventsRepository::new(&db)
            .find_by_race_id_and_timing_point(s1.id, TIMING_POINT_FINISH)
            .await
            .unwrap()
            .into_iter()
            .find(|te| te.bib == Some(3))
            .unwrap();
        assert_eq!(winner.next_race_id, Some(fa.id));
        assert_eq!(winner.next_race_position, Some(1));
        assert_eq!(winner.next_race.as_deref(), Some("FA1"));

        // Updated target bookkeeping.
        let fa_doc = RacesRepository::new(&db).find_by_id(fa.id).await.unwrap();
        assert_eq!(fa_doc.no_of_contestants, 2);
        assert_eq!(fa_doc.start_entries.len(), 2);
    }

    #[tokio::test]
    async fn second_heat_lands_behind_the_first_in_shared_targets() {
        let db = Database::new();
        let (s1, s2, fa, _fb) = bracket(&db).await;

        for (bib, clock) in [(1, "09:40:01"), (2, "09:40:02"), (3, "09:40:03"), (4, "09:40:04")] {
            RaceResultsService::create_and_process_time_event(&db, finish(&s1, bib, clock))
                .await
                .unwrap();
        }
        for (bib, clock) in [(5, "09:50:01"), (6, "09:50:02"), (7, "09:50:03"), (8, "09:50:04")] {
            RaceResultsService::create_and_process_time_event(&db, finish(&s2, bib, clock))
                .await
                .unwrap();
        }

        let fa_entries = StartEntriesRepository::new(&db)
            .find_by_race_id(fa.id)
            .await
            .unwrap();
        assert_eq!(
            fa_entries.iter().map(|e| (e.bib, e.starting_position)).collect::<Vec<_>>(),
            vec![(1, 1), (2, 2), (5, 3), (6, 4)]
        );
    }

    #[tokio::test]
    async fn dns_contestant_is_skipped_and_next_rank_drawn() {
        let db = Database::new();
        let (s1, _s2, fa, fb) = bracket(&db).await;

        // Bib 4 never starts.
        let se_repo = StartEntriesRepository::new(&db);
        let mut dns = se_repo
            .find_by_race_id_and_bib(s1.id, 4)
            .await
            .unwrap()
            .unwrap();
        dns.status = StartEntryStatus::Dns;
        se_repo.update(dns.id, dns).await.unwrap();

        for (bib, clock) in [(1, "09:40:01"), (2, "09:40:02"), (3, "09:40:03")] {
            RaceResultsService::create_and_process_time_event(&db, finish(&s1, bib, clock))
                .await
                .unwrap();
        }

        let fa_bibs: Vec<u32> = se_repo
            .find_by_race_id(fa.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.bib)
            .collect();
        let fb_bibs: Vec<u32> = se_repo
            .find_by_race_id(fb.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.bib)
            .collect();
        assert_eq!(fa_bibs, vec![1, 2]);
        assert_eq!(fb_bibs, vec![3]);
    }

    #[tokio::test]
    async fn overflowing_target_rejects_the_triggering_event() {
        let db = Database::new();
        let races_repo = RacesRepository::new(&db);
        let rule: &[(&str, &str, RuleQuota)] = &[("F", "A", RuleQuota::Count(2))];
        let mut heat = race("G16", 1, 2, 10, sprint_variant("S", 1, rule));
        let mut fa = race("G16", 2, 0, 1, sprint_variant("F", 1, &[]));
        if let RaceVariant::IndividualSprint { index, .. } = &mut fa.variant {
            *index = "A".to_string();
        }
        races_repo.create(heat.clone()).await.unwrap();
        races_repo.create(fa.clone()).await.unwrap();
        add_entries(&db, &mut heat, &[1, 2]).await;

        RaceResultsService::create_and_process_time_event(&db, finish(&heat, 1, "09:40:01"))
            .await
            .unwrap();
        let stored =
            RaceResultsService::create_and_process_time_event(&db, finish(&heat, 2, "09:40:02"))
                .await
                .unwrap();

        // The event is kept for correction, but nothing was propagated and
        // the ranking sequence holds only the accepted finish.
        assert_eq!(stored.status, TimeEventStatus::Error);
        assert!(StartEntriesRepository::new(&db)
            .find_by_race_id(fa.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            sequence_bibs(&db, heat.id, TIMING_POINT_FINISH).await,
            vec![1]
        );
    }

    #[tokio::test]
    async fn deleting_a_finish_reranks_and_removes_the_derived_entry() {
        let db = Database::new();
        let (s1, _s2, fa, _fb) = bracket(&db).await;

        let mut ids = Vec::new();
        for (bib, clock) in [(1, "09:40:01"), (2, "09:40:02"), (3, "09:40:03"), (4, "09:40:04")] {
            let stored =
                RaceResultsService::create_and_process_time_event(&db, finish(&s1, bib, clock))
                    .await
                    .unwrap();
            ids.push(stored.id);
        }
        assert_eq!(
            StartEntriesRepository::new(&db)
                .find_by_race_id(fa.id)
                .await
                .unwrap()
                .len(),
            2
        );

        // Bib 1 turns out to have been a misread: delete its finish.
        RaceResultsService::delete_time_event(&db, ids[0]).await.unwrap();

        assert_eq!(
            sequence_bibs(&db, s1.id, TIMING_POINT_FINISH).await,
            vec![2, 3, 4]
        );
        let fa_bibs: Vec<u32> = StartEntriesRepository::new(&db)
            .find_by_race_id(fa.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.bib)
            .collect();
        assert_eq!(fa_bibs, vec![2]);
        let second = TimeEventsRepository::new(&db)
            .find_by_id(ids[1])
            .await
            .unwrap();
        assert_eq!(second.rank, Some(1));
    }

    /// Sixteen-contestant sprint, end to end: plan, seed, finish both
    /// semifinals, and check the finals fill up densely.
    #[tokio::test]
    async fn sprint_semifinals_feed_the_finals_end_to_end() {
        use crate::services::raceplan_individual_sprint::calculate_raceplan_individual_sprint;
        use crate::services::startlist_entries::seed_start_entries_individual_sprint;
        use crate::services::test_support::{contestants, event_at, raceclass, sprint_format};

        let db = Database::new();
        let event = event_at("2021-09-29", "09:30:00", "Individual Sprint");
        let format = sprint_format();
        let raceclasses = vec![raceclass("G16", 1, 1, true, 16)];
        let (raceplan, races) =
            calculate_raceplan_individual_sprint(&event, &format, &raceclasses).unwrap();

        let plans_repo = crate::repository::RaceplansRepository::new(&db);
        plans_repo.create(raceplan).await.unwrap();
        let races_repo = RacesRepository::new(&db);
        for race in &races {
            races_repo.create(race.clone()).await.unwrap();
        }

        let roster = contestants("G16", 1..=16);
        let entries = seed_start_entries_individual_sprint(
            &format,
            &raceclasses,
            &races,
            &roster,
            Uuid::new_v4(),
        )
        .unwrap();
        let se_repo = StartEntriesRepository::new(&db);
        for entry in entries {
            let race_id = entry.race_id;
            let entry_id = se_repo.create(entry).await.unwrap();
            let mut race = races_repo.find_by_id(race_id).await.unwrap();
            race.start_entries.push(entry_id);
            races_repo.update(race_id, race).await.unwrap();
        }

        // Both semifinals finish in bib order, one second apart.
        let mut clock = 0u32;
        for race in races.iter().filter(|race| race.round() == Some("S")) {
            for entry in se_repo.find_by_race_id(race.id).await.unwrap() {
                clock += 1;
                let stored = RaceResultsService::create_and_process_time_event(
                    &db,
                    finish(race, entry.bib, &format!("10:{:02}:{:02}", clock / 60, clock % 60)),
                )
                .await
                .unwrap();
                assert_eq!(stored.status, TimeEventStatus::Ok);
            }
        }

        let fa = races
            .iter()
            .find(|race| race.round() == Some("F") && race.index() == Some("A"))
            .unwrap();
        let fb = races
            .iter()
            .find(|race| race.round() == Some("F") && race.index() == Some("B"))
            .unwrap();
        let fa_entries = se_repo.find_by_race_id(fa.id).await.unwrap();
        let fb_entries = se_repo.find_by_race_id(fb.id).await.unwrap();
        assert_eq!(fa_entries.len(), 8);
        assert_eq!(fb_entries.len(), 8);
        // Positions come out dense 1..=8 once both feeders are in.
        for (i, entry) in fa_entries.iter().enumerate() {
            assert_eq!(entry.starting_position, i as u32 + 1);
        }
        let fa_doc = races_repo.find_by_id(fa.id).await.unwrap();
        assert_eq!(fa_doc.no_of_contestants, 8);
    }

    #[tokio::test]
    async fn deletion_conflicts_when_downstream_events_depend_on_the_entry() {
        let db = Database::new();
        let (s1, _s2, fa, _fb) = bracket(&db).await;

        let mut winner_id = None;
        for (bib, clock) in [(1, "09:40:01"), (2, "09:40:02"), (3, "09:40:03"), (4, "09:40:04")] {
            let stored =
                RaceResultsService::create_and_process_time_event(&db, finish(&s1, bib, clock))
                    .await
                    .unwrap();
            if bib == 1 {
                winner_id = Some(stored.id);
            }
        }

        // The final has already timed bib 1.
        RaceResultsService::create_and_process_time_event(&db, finish(&fa, 1, "10:10:01"))
            .await
            .unwrap();

        let result = RaceResultsService::delete_time_event(&db, winner_id.unwrap()).await;
        assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
    }
}

async fn remove_derived_entry(
    db: &Database,
    time_event_id: Uuid,
    next_race_id: Uuid,
    bib: u32,
) -> Result<()> {
    let te_repo = TimeEventsRepository::new(db);
    let downstream = te_repo.find_by_race_id(next_race_id).await?;
    if downstream.iter().any(|event| event.bib == Some(bib)) {
        return Err(StorageError::ConstraintViolation(format!(
            "Cannot delete time-event {time_event_id}: race {next_race_id} already has time-events for bib {bib}."
        )));
    }

    let se_repo = StartEntriesRepository::new(db);
    if let Some(entry) = se_repo.find_by_race_id_and_bib(next_race_id, bib).await? {
        se_repo.delete(entry.id).await?;
        let races_repo = RacesRepository::new(db);
        let mut target = races_repo.find_by_id(next_race_id).await?;
        target.start_entries.retain(|&id| id != entry.id);
        target.no_of_contestants = target.start_entries.len() as u32;
        races_repo.update(target.id, target).await?;
    }
    Ok(())
}
