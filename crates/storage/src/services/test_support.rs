//! Fixtures shared by the service tests.

use std::collections::BTreeMap;

use crate::models::{
    CompetitionFormat, Contestant, Event, RaceConfig, Raceclass, Rule, RuleKeyword, RuleQuota,
};

pub fn event_at(date: &str, time: &str, format_name: &str) -> Event {
    Event {
        id: "290e70d5-0933-4af0-bb53-1d705ba7eb95".to_string(),
        name: Some("Oslo Skagen sprint".to_string()),
        date_of_event: date.to_string(),
        time_of_event: time.to_string(),
        competition_format: format_name.to_string(),
        timezone: Some("Europe/Oslo".to_string()),
    }
}

pub fn raceclass(name: &str, group: u32, order: u32, ranking: bool, n: u32) -> Raceclass {
    Raceclass {
        id: None,
        name: name.to_string(),
        ageclasses: vec![name.to_string()],
        no_of_contestants: n,
        ranking,
        group,
        order,
    }
}

pub fn contestants(ageclass: &str, bibs: std::ops::RangeInclusive<u32>) -> Vec<Contestant> {
    bibs.map(|bib| Contestant {
        id: None,
        first_name: format!("First{bib}"),
        last_name: format!("Last{bib}"),
        club: format!("Club {}", bib % 3),
        ageclass: ageclass.to_string(),
        bib: Some(bib),
    })
    .collect()
}

pub fn interval_start_format(intervals: &str) -> CompetitionFormat {
    CompetitionFormat {
        name: "Interval Start".to_string(),
        starting_order: Some("interval_start".to_string()),
        start_procedure: Some("interval_start".to_string()),
        time_between_groups: "00:10:00".to_string(),
        time_between_rounds: None,
        time_between_races: "00:02:00".to_string(),
        time_between_heats: None,
        intervals: Some(intervals.to_string()),
        max_no_of_contestants_in_raceclass: 9999,
        max_no_of_contestants_in_race: 9999,
        rounds_ranked_classes: None,
        rounds_non_ranked_classes: None,
        race_config_ranked: None,
        race_config_non_ranked: None,
    }
}

pub fn mass_start_format(max_in_race: u32) -> CompetitionFormat {
    CompetitionFormat {
        name: "Mass Start".to_string(),
        starting_order: Some("draw".to_string()),
        start_procedure: Some("mass_start".to_string()),
        time_between_groups: "00:10:00".to_string(),
        time_between_rounds: None,
        time_between_races: "00:02:00".to_string(),
        time_between_heats: None,
        intervals: None,
        max_no_of_contestants_in_raceclass: 9999,
        max_no_of_contestants_in_race: max_in_race,
        rounds_ranked_classes: None,
        rounds_non_ranked_classes: None,
        race_config_ranked: None,
        race_config_non_ranked: None,
    }
}

pub fn sprint_format() -> CompetitionFormat {
    CompetitionFormat {
        name: "Individual Sprint".to_string(),
        starting_order: Some("draw".to_string()),
        start_procedure: Some("heat_start".to_string()),
        time_between_groups: "00:30:00".to_string(),
        time_between_rounds: Some("00:10:00".to_string()),
        time_between_races: "00:02:30".to_string(),
        time_between_heats: Some("00:02:30".to_string()),
        intervals: None,
        max_no_of_contestants_in_raceclass: 80,
        max_no_of_contestants_in_race: 10,
        rounds_ranked_classes: Some(vec!["Q".into(), "S".into(), "F".into()]),
        rounds_non_ranked_classes: Some(vec!["R1".into(), "R2".into()]),
        race_config_ranked: Some(ranked_rows()),
        race_config_non_ranked: Some(non_ranked_rows()),
    }
}

pub fn count(n: u32) -> RuleQuota {
    RuleQuota::Count(n)
}

pub fn rest() -> RuleQuota {
    RuleQuota::Keyword(RuleKeyword::Rest)
}

pub fn all() -> RuleQuota {
    RuleQuota::Keyword(RuleKeyword::All)
}

fn row(
    max: u32,
    rounds: &[&str],
    heats: &[(&str, &str, u32)],
    rules: &[(&str, &str, &[(&str, &str, RuleQuota)])],
) -> RaceConfig {
    let mut no_of_heats: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
    for (round, index, n) in heats {
        no_of_heats
            .entry((*round).to_string())
            .or_default()
            .insert((*index).to_string(), *n);
    }
    let mut from_to: BTreeMap<String, BTreeMap<String, Rule>> = BTreeMap::new();
    for (round, index, entries) in rules {
        let mut rule = Rule::new();
        for (to_round, to_index, quota) in *entries {
            rule.entry((*to_round).to_string())
                .or_default()
                .insert((*to_index).to_string(), *quota);
        }
        from_to
            .entry((*round).to_string())
            .or_default()
            .insert((*index).to_string(), rule);
    }
    RaceConfig {
        max_no_of_contestants: max,
        rounds: rounds.iter().map(|r| (*r).to_string()).collect(),
        no_of_heats,
        from_to,
    }
}

/// The normative progression matrix for ranked sprint classes.
fn ranked_rows() -> Vec<RaceConfig> {
    vec![
        row(
            7,
            &["S", "F"],
            &[("S", "A", 1), ("F", "A", 1)],
            &[("S", "A", &[("F", "A", all())])],
        ),
        row(
            16,
            &["S", "F"],
            &[("S", "A", 2), ("F", "A", 1), ("F", "B", 1)],
            &[("S", "A", &[("F", "A", count(4)), ("F", "B", rest())])],
        ),
        row(
            24,
            &["Q", "S", "F"],
            &[
                ("Q", "", 3),
                ("S", "A", 2),
                ("F", "A", 1),
                ("F", "B", 1),
                ("F", "C", 1),
            ],
            &[
                ("Q", "", &[("S", "A", count(5)), ("F", "C", rest())]),
                ("S", "A", &[("F", "A", count(4)), ("F", "B", rest())]),
            ],
        ),
        row(
            32,
            &["Q", "S", "F"],
            &[
                ("Q", "", 4),
                ("S", "A", 2),
                ("S", "C", 2),
                ("F", "A", 1),
                ("F", "B", 1),
                ("F", "C", 1),
            ],
            &[
                ("Q", "", &[("S", "A", count(4)), ("S", "C", rest())]),
                ("S", "A", &[("F", "A", count(4)), ("F", "B", rest())]),
                ("S", "C", &[("F", "C", count(4))]),
            ],
        ),
        row(
            40,
            &["Q", "S", "F"],
            &[
                ("Q", "", 5),
                ("S", "A", 3),
                ("S", "C", 2),
                ("F", "A", 1),
                ("F", "B", 1),
                ("F", "C", 1),
            ],
            &[
                ("Q", "", &[("S", "A", count(5)), ("S", "C", rest())]),
                ("S", "A", &[("F", "A", count(3)), ("F", "B", count(3))]),
                ("S", "C", &[("F", "C", count(4))]),
            ],
        ),
        row(
            48,
            &["Q", "S", "F"],
            &[
                ("Q", "", 6),
                ("S", "A", 3),
                ("S", "C", 3),
                ("F", "A", 1),
                ("F", "B", 1),
                ("F", "C", 1),
            ],
            &[
                ("Q", "", &[("S", "A", count(4)), ("S", "C", rest())]),
                ("S", "A", &[("F", "A", count(3)), ("F", "B", count(3))]),
                ("S", "C", &[("F", "C", count(3))]),
            ],
        ),
        row(
            56,
            &["Q", "S", "F"],
            &[
                ("Q", "", 7),
                ("S", "A", 4),
                ("S", "C", 3),
                ("F", "A", 1),
                ("F", "B", 1),
                ("F", "C", 1),
            ],
            &[
                ("Q", "", &[("S", "A", count(5)), ("S", "C", rest())]),
                ("S", "A", &[("F", "A", count(2)), ("F", "B", count(2))]),
                ("S", "C", &[("F", "C", count(3))]),
            ],
        ),
        row(
            80,
            &["Q", "S", "F"],
            &[
                ("Q", "", 8),
                ("S", "A", 4),
                ("S", "C", 4),
                ("F", "A", 1),
                ("F", "B", 1),
                ("F", "C", 1),
            ],
            &[
                ("Q", "", &[("S", "A", count(4)), ("S", "C", rest())]),
                ("S", "A", &[("F", "A", count(2)), ("F", "B", count(2))]),
                ("S", "C", &[("F", "C", count(2))]),
            ],
        ),
    ]
}

/// Non-ranked classes run every contestant through both rounds.
fn non_ranked_rows() -> Vec<RaceConfig> {
    vec![
        row(
            10,
            &["R1", "R2"],
            &[("R1", "", 1), ("R2", "", 1)],
            &[("R1", "", &[("R2", "", all())])],
        ),
        row(
            20,
            &["R1", "R2"],
            &[("R1", "", 2), ("R2", "", 2)],
            &[("R1", "", &[("R2", "", all())])],
        ),
    ]
}
