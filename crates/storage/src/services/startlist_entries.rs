//! Start-entry seeding for the first round of every raceclass. The roster
//! order handed over by the events service is the seed order.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    CompetitionFormat, Contestant, Race, Raceclass, StartEntry, StartEntryStatus,
};

use super::raceplan_individual_sprint::ProgressionMatrix;

/// Interval start: single race per class, one start per interval.
pub fn seed_start_entries_interval_start(
    competition_format: &CompetitionFormat,
    raceclasses: &[Raceclass],
    races: &[Race],
    contestants: &[Contestant],
    startlist_id: Uuid,
) -> Result<Vec<StartEntry>> {
    let interval = competition_format.start_interval()?;

    let mut start_entries: Vec<StartEntry> = Vec::new();
    for raceclass in raceclasses {
        for race in races.iter().filter(|race| race.raceclass == raceclass.name) {
            let roster = contestants_in_class(raceclass, contestants);
            ensure_capacity(race, roster.len())?;
            for (position, contestant) in roster.iter().enumerate() {
                let position = position as u32 + 1;
                let scheduled = race.start_time + interval * (position as i32 - 1);
                start_entries.push(new_entry(race, contestant, position, scheduled, startlist_id)?);
            }
        }
    }
    Ok(start_entries)
}

/// Mass-start family: everyone in the class starts on the race start time.
pub fn seed_start_entries_mass_start(
    raceclasses: &[Raceclass],
    races: &[Race],
    contestants: &[Contestant],
    startlist_id: Uuid,
) -> Result<Vec<StartEntry>> {
    let mut start_entries: Vec<StartEntry> = Vec::new();
    for raceclass in raceclasses {
        for race in races.iter().filter(|race| race.raceclass == raceclass.name) {
            let roster = contestants_in_class(raceclass, contestants);
            ensure_capacity(race, roster.len())?;
            for (position, contestant) in roster.iter().enumerate() {
                let position = position as u32 + 1;
                start_entries.push(new_entry(
                    race,
                    contestant,
                    position,
                    race.start_time,
                    startlist_id,
                )?);
            }
        }
    }
    Ok(start_entries)
}

/// Individual sprint: deal the class roster over the first-round heats in
/// serpentine order (heats 1..H, then H..1, ...), honoring each heat's
/// planned contestant count. Positions within a heat follow deal order.
pub fn seed_start_entries_individual_sprint(
    competition_format: &CompetitionFormat,
    raceclasses: &[Raceclass],
    races: &[Race],
    contestants: &[Contestant],
    startlist_id: Uuid,
) -> Result<Vec<StartEntry>> {
    let mut start_entries: Vec<StartEntry> = Vec::new();
    for raceclass in raceclasses {
        let matrix = ProgressionMatrix::for_ranking(competition_format, raceclass.ranking)?;
        let rounds = matrix.rounds_in_class(raceclass.no_of_contestants)?;
        let first_round = rounds.first().ok_or_else(|| {
            StorageError::IllegalValue(format!(
                "No rounds configured for raceclass {}.",
                raceclass.name
            ))
        })?;

        let mut heats: Vec<&Race> = races
            .iter()
            .filter(|race| {
                race.raceclass == raceclass.name && race.round() == Some(first_round.as_str())
            })
            .collect();
        heats.sort_by_key(|race| race.heat());
        if heats.is_empty() {
            return Err(StorageError::IllegalValue(format!(
                "No first-round races for raceclass {}.",
                raceclass.name
            )));
        }

        let roster = contestants_in_class(raceclass, contestants);
        start_entries.extend(deal_serpentine(&heats, &roster, startlist_id)?);
    }
    Ok(start_entries)
}

fn deal_serpentine(
    heats: &[&Race],
    roster: &[&Contestant],
    startlist_id: Uuid,
) -> Result<Vec<StartEntry>> {
    let mut entries: Vec<StartEntry> = Vec::new();
    let mut filled = vec![0u32; heats.len()];
    let mut next = roster.iter();
    let mut pending = next.next();
    let mut forward = true;

    while pending.is_some() {
        let order: Vec<usize> = if forward {
            (0..heats.len()).collect()
        } else {
            (0..heats.len()).rev().collect()
        };
        let mut placed = false;
        for i in order {
            let Some(contestant) = pending else { break };
            if filled[i] < heats[i].no_of_contestants {
                filled[i] += 1;
                entries.push(new_entry(
                    heats[i],
                    contestant,
                    filled[i],
                    heats[i].start_time,
                    startlist_id,
                )?);
                placed = true;
                pending = next.next();
            }
        }
        if pending.is_some() && !placed {
            return Err(StorageError::IllegalValue(format!(
                "More contestants than planned capacity in first-round races of raceclass {}.",
                heats[0].raceclass
            )));
        }
        forward = !forward;
    }
    Ok(entries)
}

fn contestants_in_class<'a>(
    raceclass: &Raceclass,
    contestants: &'a [Contestant],
) -> Vec<&'a Contestant> {
    contestants
        .iter()
        .filter(|contestant| raceclass.ageclasses.contains(&contestant.ageclass))
        .collect()
}

fn ensure_capacity(race: &Race, entries: usize) -> Result<()> {
    if entries as u32 > race.max_no_of_contestants {
        return Err(StorageError::ConstraintViolation(format!(
            "Race {} cannot hold {} contestants (max {}).",
            race.id, entries, race.max_no_of_contestants
        )));
    }
    Ok(())
}

fn new_entry(
    race: &Race,
    contestant: &Contestant,
    starting_position: u32,
    scheduled_start_time: NaiveDateTime,
    startlist_id: Uuid,
) -> Result<StartEntry> {
    let bib = contestant.bib.ok_or_else(|| {
        StorageError::IllegalValue(format!(
            "Contestant {} has no bib assigned.",
            contestant.full_name()
        ))
    })?;
    Ok(StartEntry {
        id: Uuid::new_v4(),
        race_id: race.id,
        startlist_id: Some(startlist_id),
        bib,
        name: contestant.full_name(),
        club: contestant.club.clone(),
        starting_position,
        scheduled_start_time,
        actual_start_time: None,
        status: StartEntryStatus::None,
        changelog: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::raceplan_individual_sprint::calculate_raceplan_individual_sprint;
    use crate::services::raceplan_interval_start::calculate_raceplan_interval_start;
    use crate::services::test_support::{
        contestants, event_at, interval_start_format, raceclass, sprint_format,
    };

    #[test]
    fn interval_start_entries_step_by_the_interval() {
        let event = event_at("2023-08-17", "09:00:00", "Interval Start");
        let format = interval_start_format("00:00:30");
        let raceclasses = vec![raceclass("G16", 1, 1, true, 10)];
        let (_, races) =
            calculate_raceplan_interval_start(&event, &format, &raceclasses).unwrap();
        let roster = contestants("G16", 1..=10);

        let entries = seed_start_entries_interval_start(
            &format,
            &raceclasses,
            &races,
            &roster,
            Uuid::new_v4(),
        )
        .unwrap();

        assert_eq!(entries.len(), 10);
        assert_eq!(
            entries.iter().map(|e| e.starting_position).collect::<Vec<_>>(),
            (1..=10).collect::<Vec<_>>()
        );
        assert_eq!(
            entries[0].scheduled_start_time.to_string(),
            "2023-08-17 09:00:00"
        );
        assert_eq!(
            entries[1].scheduled_start_time.to_string(),
            "2023-08-17 09:00:30"
        );
        assert_eq!(
            entries[9].scheduled_start_time.to_string(),
            "2023-08-17 09:04:30"
        );
    }

    #[test]
    fn sprint_roster_is_dealt_serpentine_over_the_heats() {
        let event = event_at("2021-09-29", "09:30:00", "Individual Sprint");
        let format = sprint_format();
        let raceclasses = vec![raceclass("G16", 1, 1, true, 16)];
        let (_, races) =
            calculate_raceplan_individual_sprint(&event, &format, &raceclasses).unwrap();
        let roster = contestants("G16", 1..=16);

        let entries = seed_start_entries_individual_sprint(
            &format,
            &raceclasses,
            &races,
            &roster,
            Uuid::new_v4(),
        )
        .unwrap();

        assert_eq!(entries.len(), 16);
        let heat = |entry: &StartEntry| {
            races
                .iter()
                .find(|race| race.id == entry.race_id)
                .and_then(|race| race.heat())
                .unwrap()
        };
        let heat_one: Vec<u32> = entries
            .iter()
            .filter(|e| heat(e) == 1)
            .map(|e| e.bib)
            .collect();
        let heat_two: Vec<u32> = entries
            .iter()
            .filter(|e| heat(e) == 2)
            .map(|e| e.bib)
            .collect();
        assert_eq!(heat_one, vec![1, 4, 5, 8, 9, 12, 13, 16]);
        assert_eq!(heat_two, vec![2, 3, 6, 7, 10, 11, 14, 15]);
        // Positions are dense 1..8 in deal order, everyone starts on the gun.
        for entries_of_heat in [&heat_one, &heat_two] {
            assert_eq!(entries_of_heat.len(), 8);
        }
        for entry in &entries {
            let race = races.iter().find(|race| race.id == entry.race_id).unwrap();
            assert_eq!(entry.scheduled_start_time, race.start_time);
        }
    }

    #[test]
    fn serpentine_deal_respects_planned_heat_sizes() {
        let event = event_at("2021-09-29", "09:30:00", "Individual Sprint");
        let format = sprint_format();
        let raceclasses = vec![raceclass("G16", 1, 1, true, 15)];
        let (_, races) =
            calculate_raceplan_individual_sprint(&event, &format, &raceclasses).unwrap();
        let roster = contestants("G16", 1..=15);

        let entries = seed_start_entries_individual_sprint(
            &format,
            &raceclasses,
            &races,
            &roster,
            Uuid::new_v4(),
        )
        .unwrap();

        // Planned 8 + 7 over the two semifinal heats.
        let first_round: Vec<&Race> = races
            .iter()
            .filter(|race| race.round() == Some("S"))
            .collect();
        for race in first_round {
            let dealt = entries.iter().filter(|e| e.race_id == race.id).count() as u32;
            assert_eq!(dealt, race.no_of_contestants);
        }
    }

    #[test]
    fn mass_start_entries_all_start_on_the_gun() {
        use crate::services::raceplan_fixed_start::calculate_raceplan_fixed_start;
        use crate::services::test_support::mass_start_format;

        let event = event_at("2023-02-11", "11:00:00", "Mass Start");
        let format = mass_start_format(40);
        let raceclasses = vec![raceclass("M19-20", 1, 1, true, 40)];
        let (_, races) = calculate_raceplan_fixed_start(&event, &format, &raceclasses).unwrap();
        let roster = contestants("M19-20", 1..=40);

        let entries =
            seed_start_entries_mass_start(&raceclasses, &races, &roster, Uuid::new_v4()).unwrap();

        assert_eq!(entries.len(), 40);
        assert_eq!(
            entries.iter().map(|e| e.starting_position).collect::<Vec<_>>(),
            (1..=40).collect::<Vec<_>>()
        );
        assert!(entries
            .iter()
            .all(|e| e.scheduled_start_time == races[0].start_time));
        // Seed order is the roster order.
        assert_eq!(
            entries.iter().map(|e| e.bib).collect::<Vec<_>>(),
            (1..=40).collect::<Vec<_>>()
        );
    }

    #[test]
    fn contestant_without_bib_is_rejected() {
        let event = event_at("2023-08-17", "09:00:00", "Interval Start");
        let format = interval_start_format("00:00:30");
        let raceclasses = vec![raceclass("G16", 1, 1, true, 1)];
        let (_, races) =
            calculate_raceplan_interval_start(&event, &format, &raceclasses).unwrap();
        let mut roster = contestants("G16", 1..=1);
        roster[0].bib = None;

        let result = seed_start_entries_interval_start(
            &format,
            &raceclasses,
            &races,
            &roster,
            Uuid::new_v4(),
        );
        assert!(matches!(result, Err(StorageError::IllegalValue(_))));
    }
}
