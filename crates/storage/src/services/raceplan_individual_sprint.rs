//! Raceplan calculation for the Individual Sprint format: a round-by-round
//! knockout bracket per raceclass, shaped by the progression matrix of the
//! competition format.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    CompetitionFormat, Event, Race, RaceConfig, RaceVariant, Raceclass, Raceplan, Rule, RuleQuota,
};

use super::raceclasses::group_raceclasses;

/// View over the progression matrix of a competition format, for either the
/// ranked or the non-ranked raceclasses. Row selection is by contestant
/// count: the smallest row that still fits.
pub struct ProgressionMatrix<'a> {
    rounds: &'a [String],
    configs: &'a [RaceConfig],
    max_in_raceclass: u32,
}

impl<'a> ProgressionMatrix<'a> {
    pub fn for_ranking(competition_format: &'a CompetitionFormat, ranking: bool) -> Result<Self> {
        let (rounds, configs) = if ranking {
            (
                competition_format.rounds_ranked_classes.as_deref(),
                competition_format.race_config_ranked.as_deref(),
            )
        } else {
            (
                competition_format.rounds_non_ranked_classes.as_deref(),
                competition_format.race_config_non_ranked.as_deref(),
            )
        };
        let which = if ranking { "ranked" } else { "non_ranked" };
        let rounds = rounds.ok_or_else(|| {
            StorageError::IllegalValue(format!(
                "Competition format \"{}\" is missing the \"rounds_{which}_classes\" property.",
                competition_format.name
            ))
        })?;
        let configs = configs.ok_or_else(|| {
            StorageError::IllegalValue(format!(
                "Competition format \"{}\" is missing the \"race_config_{which}\" property.",
                competition_format.name
            ))
        })?;
        Ok(Self {
            rounds,
            configs,
            max_in_raceclass: competition_format.max_no_of_contestants_in_raceclass,
        })
    }

    /// All rounds the format can run, in running order.
    pub fn rounds(&self) -> &[String] {
        self.rounds
    }

    fn row(&self, no_of_contestants: u32) -> Result<&RaceConfig> {
        if no_of_contestants > self.max_in_raceclass {
            return Err(StorageError::IllegalValue(format!(
                "Unsupported value for no of contestants: {no_of_contestants}"
            )));
        }
        self.configs
            .iter()
            .find(|config| no_of_contestants <= config.max_no_of_contestants)
            .ok_or_else(|| {
                StorageError::IllegalValue(format!(
                    "Unsupported value for no of contestants: {no_of_contestants}"
                ))
            })
    }

    /// The rounds a class of this size actually runs.
    pub fn rounds_in_class(&self, no_of_contestants: u32) -> Result<&[String]> {
        Ok(&self.row(no_of_contestants)?.rounds)
    }

    pub fn indexes(&self, no_of_contestants: u32, round: &str) -> Result<Vec<String>> {
        Ok(self
            .row(no_of_contestants)?
            .no_of_heats
            .get(round)
            .map(|by_index| by_index.keys().cloned().collect())
            .unwrap_or_default())
    }

    pub fn heats(&self, no_of_contestants: u32, round: &str, index: &str) -> Result<u32> {
        Ok(self
            .row(no_of_contestants)?
            .no_of_heats
            .get(round)
            .and_then(|by_index| by_index.get(index))
            .copied()
            .unwrap_or(0))
    }

    pub fn rule(&self, no_of_contestants: u32, round: &str, index: &str) -> Result<Rule> {
        Ok(self
            .row(no_of_contestants)?
            .from_to
            .get(round)
            .and_then(|by_index| by_index.get(index))
            .cloned()
            .unwrap_or_default())
    }
}

/// Calculate the full bracket for every raceclass. Races come out in bracket
/// order per group with `order` strictly increasing across the event.
pub fn calculate_raceplan_individual_sprint(
    event: &Event,
    competition_format: &CompetitionFormat,
    raceclasses: &[Raceclass],
) -> Result<(Raceplan, Vec<Race>)> {
    let group_gap = competition_format.group_gap()?;
    let heat_gap = competition_format.heat_gap()?;
    let round_gap = competition_format.round_gap()?;

    let mut raceplan = Raceplan {
        id: Uuid::new_v4(),
        event_id: event.id.clone(),
        no_of_contestants: raceclasses.iter().map(|r| r.no_of_contestants).sum(),
        races: Vec::new(),
    };
    let mut races: Vec<Race> = Vec::new();

    let mut start_time = event.starting_time()?;
    let mut order = 1;
    let groups = group_raceclasses(raceclasses);
    for group in &groups {
        let matrix = ProgressionMatrix::for_ranking(competition_format, group[0].ranking)?;
        for round in matrix.rounds() {
            let mut emitted_in_round = false;
            for raceclass in group {
                let n = raceclass.no_of_contestants;
                // Reversed index order puts consolation races before the
                // races they feed from: SC before SA, finals as FC, FB, FA.
                let mut indexes = matrix.indexes(n, round)?;
                indexes.reverse();
                for index in &indexes {
                    for heat in 1..=matrix.heats(n, round, index)? {
                        let race = Race {
                            id: Uuid::new_v4(),
                            raceclass: raceclass.name.clone(),
                            order,
                            start_time,
                            max_no_of_contestants: competition_format
                                .max_no_of_contestants_in_race,
                            no_of_contestants: 0,
                            event_id: event.id.clone(),
                            raceplan_id: raceplan.id,
                            start_entries: Vec::new(),
                            results: Default::default(),
                            variant: RaceVariant::IndividualSprint {
                                round: round.clone(),
                                index: index.clone(),
                                heat,
                                rule: matrix.rule(n, round, index)?,
                            },
                        };
                        raceplan.races.push(race.id);
                        races.push(race);
                        order += 1;
                        start_time += heat_gap;
                        emitted_in_round = true;
                    }
                }
            }
            if emitted_in_round {
                start_time = start_time - heat_gap + round_gap;
            }
        }
        start_time += group_gap;
    }

    for group in &groups {
        let matrix = ProgressionMatrix::for_ranking(competition_format, group[0].ranking)?;
        for raceclass in group {
            distribute_contestants(raceclass, &matrix, &mut races)?;
        }
    }

    Ok((raceplan, races))
}

/// Walk the bracket of one raceclass and plan how many contestants each heat
/// will hold: the first round takes the whole class, later rounds take what
/// the progression rules of the round before send them.
fn distribute_contestants(
    raceclass: &Raceclass,
    matrix: &ProgressionMatrix<'_>,
    races: &mut [Race],
) -> Result<()> {
    let n = raceclass.no_of_contestants;
    let rounds = matrix.rounds_in_class(n)?.to_vec();

    let mut tally: BTreeMap<(String, String), u32> = BTreeMap::new();
    let first_round = rounds.first().ok_or_else(|| {
        StorageError::IllegalValue(format!(
            "No rounds configured for raceclass {}.",
            raceclass.name
        ))
    })?;
    let first_index = matrix
        .indexes(n, first_round)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            StorageError::IllegalValue(format!(
                "No heats configured for first round of raceclass {}.",
                raceclass.name
            ))
        })?;
    tally.insert((first_round.clone(), first_index), n);

    for round in &rounds {
        for index in matrix.indexes(n, round)? {
            let total = tally
                .get(&(round.clone(), index.clone()))
                .copied()
                .unwrap_or(0);
            spread_over_heats(raceclass, round, &index, total, races)?;
        }

        let rule_walks: Vec<(Rule, u32)> = races
            .iter()
            .filter(|race| {
                race.raceclass == raceclass.name && race.round() == Some(round.as_str())
            })
            .map(|race| {
                (
                    race.rule().cloned().unwrap_or_default(),
                    race.no_of_contestants,
                )
            })
            .collect();
        for (rule, mut remaining) in rule_walks {
            for (to_round, to_index, quota) in ordered_rule_entries(&rule, &rounds) {
                let slot = tally.entry((to_round, to_index)).or_insert(0);
                match quota {
                    RuleQuota::Count(count) => {
                        let taken = count.min(remaining);
                        *slot += taken;
                        remaining -= taken;
                    }
                    RuleQuota::Keyword(_) => {
                        *slot += remaining;
                        remaining = 0;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Smooth `total` contestants over the heats of one `(round, index)`: the
/// first `total % heats` heats take one extra.
fn spread_over_heats(
    raceclass: &Raceclass,
    round: &str,
    index: &str,
    total: u32,
    races: &mut [Race],
) -> Result<()> {
    let heats: Vec<&mut Race> = races
        .iter_mut()
        .filter(|race| {
            race.raceclass == raceclass.name
                && race.round() == Some(round)
                && race.index() == Some(index)
        })
        .collect();
    let no_of_races = heats.len() as u32;
    if no_of_races == 0 {
        return Ok(());
    }
    let quotient = total / no_of_races;
    let remainder = total % no_of_races;
    for race in heats {
        let heat = race.heat().unwrap_or(0);
        race.no_of_contestants = if heat <= remainder {
            quotient + 1
        } else {
            quotient
        };
        if race.no_of_contestants > race.max_no_of_contestants {
            return Err(StorageError::IllegalValue(format!(
                "Too many contestants in race raceclass/round/index {}/{}/{}: {}.",
                raceclass.name, round, index, race.no_of_contestants
            )));
        }
    }
    Ok(())
}

/// Flatten a progression rule into processing order: counted quotas first,
/// REST/ALL last, ties broken by target round order and index.
pub(crate) fn ordered_rule_entries(
    rule: &Rule,
    rounds: &[String],
) -> Vec<(String, String, RuleQuota)> {
    let round_rank =
        |round: &str| rounds.iter().position(|r| r == round).unwrap_or(usize::MAX);
    let mut entries: Vec<(String, String, RuleQuota)> = rule
        .iter()
        .flat_map(|(to_round, by_index)| {
            by_index
                .iter()
                .map(move |(to_index, quota)| (to_round.clone(), to_index.clone(), *quota))
        })
        .collect();
    entries.sort_by_key(|(to_round, to_index, quota)| {
        (!quota.is_counted(), round_rank(to_round), to_index.clone())
    });
    entries
}
