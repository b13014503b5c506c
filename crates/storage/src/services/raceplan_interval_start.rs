//! Raceplan calculation for the Interval Start format: one individually
//! started race per raceclass.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{CompetitionFormat, Event, Race, RaceVariant, Raceclass, Raceplan};

use super::raceclasses::group_raceclasses;

/// Calculate the raceplan and its races. Nothing is persisted here; the
/// caller owns the write and its rollback.
pub fn calculate_raceplan_interval_start(
    event: &Event,
    competition_format: &CompetitionFormat,
    raceclasses: &[Raceclass],
) -> Result<(Raceplan, Vec<Race>)> {
    let group_gap = competition_format.group_gap()?;
    let race_gap = competition_format.race_gap()?;
    let interval = competition_format.start_interval()?;

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
                max_no_of_contestants: raceclass.no_of_contestants,
                // Populated when the startlist is generated.
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
            // The class occupies the track for one interval per contestant.
            start_time += interval * raceclass.no_of_contestants as i32 + race_gap;
        }
        start_time += group_gap;
    }

    Ok((raceplan, races))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{event_at, interval_start_format, raceclass};

    #[test]
    fn single_raceclass_gets_one_race_at_event_start() {
        let event = event_at("2023-08-17", "09:00:00", "Interval Start");
        let format = interval_start_format("00:00:30");
        let raceclasses = vec![raceclass("G16", 1, 1, true, 10)];

        let (raceplan, races) =
            calculate_raceplan_interval_start(&event, &format, &raceclasses).unwrap();

        assert_eq!(races.len(), 1);
        assert_eq!(raceplan.no_of_contestants, 10);
        assert_eq!(raceplan.races, vec![races[0].id]);
        assert_eq!(races[0].order, 1);
        assert_eq!(races[0].start_time.to_string(), "2023-08-17 09:00:00");
        assert_eq!(races[0].max_no_of_contestants, 10);
        assert_eq!(races[0].no_of_contestants, 0);
        assert_eq!(races[0].variant, RaceVariant::IntervalStart);
    }

    #[test]
    fn later_classes_start_after_previous_class_has_cleared_the_start() {
        let event = event_at("2023-08-17", "09:00:00", "Interval Start");
        let format = interval_start_format("00:00:30");
        let raceclasses = vec![
            raceclass("G15", 1, 1, true, 10),
            raceclass("G16", 1, 2, true, 8),
            raceclass("J16", 2, 1, true, 4),
        ];

        let (_, races) = calculate_raceplan_interval_start(&event, &format, &raceclasses).unwrap();

        assert_eq!(races.len(), 3);
        assert_eq!(
            races.iter().map(|r| r.order).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        // 10 contestants x 30s + 00:02:00 between races.
        assert_eq!(races[1].start_time.to_string(), "2023-08-17 09:07:00");
        // 8 x 30s + race gap + 00:10:00 between groups.
        assert_eq!(races[2].start_time.to_string(), "2023-08-17 09:23:00");
        assert!(races.windows(2).all(|w| w[0].start_time < w[1].start_time));
    }
}
