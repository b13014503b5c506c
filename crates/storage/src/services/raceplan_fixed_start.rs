//! Raceplan calculation for formats where every contestant in a raceclass
//! starts together: Mass Start, Skiathlon, Pursuit, Team Sprint and Relay.
//! The plan surface is one race per raceclass; multi-stage formats differ
//! only in what happens on the track.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{CompetitionFormat, Event, Race, RaceVariant, Raceclass, Raceplan};

use super::raceclasses::group_raceclasses;

pub fn calculate_raceplan_fixed_start(
    event: &Event,
    competition_format: &CompetitionFormat,
    raceclasses: &[Raceclass],
) -> Result<(Raceplan, Vec<Race>)> {
    let group_gap = competition_format.group_gap()?;
    let race_gap = competition_format.race_gap()?;

    let mut raceplan = Raceplan {
        id: Uuid::new_v4(),
        event_id: event.id.clone(),
        no_of_contestants: raceclasses.iter().map(|r| r.no_of_contestants).sum(),
        races: Vec::new(),
    };
    let mut races: Vec<Race> = Vec::new();

    let mut start_time = event.starting_time()?;
    let mut order = 1;
    for group in group_raceclasses(raceclasses) {
        for raceclass in group {
            let race = Race {
                id: Uuid::new_v4(),
                raceclass: raceclass.name.clone(),
                order,
                start_time,
                max_no_of_contestants: competition_format.max_no_of_contestants_in_race,
                no_of_contestants: 0,
                event_id: event.id.clone(),
                raceplan_id: raceplan.id,
                start_entries: Vec::new(),
                results: Default::default(),
                variant: RaceVariant::IntervalStart,
            };
            raceplan.races.push(race.id);
            races.push(race);
            order += 1;
            start_time += race_gap;
        }
        start_time += group_gap;
    }

    Ok((raceplan, races))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{event_at, mass_start_format, raceclass};

    #[test]
    fn mass_start_emits_one_race_per_class() {
        let event = event_at("2023-02-11", "11:00:00", "Mass Start");
        let format = mass_start_format(40);
        let raceclasses = vec![raceclass("M19-20", 1, 1, true, 40)];

        let (raceplan, races) =
            calculate_raceplan_fixed_start(&event, &format, &raceclasses).unwrap();

        assert_eq!(races.len(), 1);
        assert_eq!(races[0].max_no_of_contestants, 40);
        assert_eq!(races[0].start_time.to_string(), "2023-02-11 11:00:00");
        assert_eq!(raceplan.no_of_contestants, 40);
    }

    #[test]
    fn classes_are_spaced_by_the_race_gap() {
        let event = event_at("2023-02-11", "11:00:00", "Mass Start");
        let format = mass_start_format(40);
        let raceclasses = vec![
            raceclass("M19-20", 1, 1, true, 30),
            raceclass("K19-20", 1, 2, true, 25),
        ];

        let (_, races) = calculate_raceplan_fixed_start(&event, &format, &raceclasses).unwrap();

        assert_eq!(races[1].start_time.to_string(), "2023-02-11 11:02:00");
        assert_eq!(races[1].order, 2);
    }
}
