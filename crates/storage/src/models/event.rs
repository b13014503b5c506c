//! Catalog types owned by the external events and competition-format
//! services. They are inputs to plan and startlist generation and are never
//! persisted here.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::race::Rule;
use crate::error::{Result, StorageError};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: String,
    pub name: Option<String>,
    pub date_of_event: String,
    pub time_of_event: String,
    pub competition_format: String,
    pub timezone: Option<String>,
}

impl Event {
    /// First start time of the event: `date_of_event` + `time_of_event`.
    pub fn starting_time(&self) -> Result<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(&self.date_of_event, "%Y-%m-%d")
            .map_err(|_| {
                StorageError::IllegalValue(format!(
                    "Date \"{}\" has invalid format.",
                    self.date_of_event
                ))
            })?;
        let time = parse_time(&self.time_of_event)?;
        Ok(NaiveDateTime::new(date, time))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Raceclass {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub ageclasses: Vec<String>,
    pub no_of_contestants: u32,
    pub ranking: bool,
    pub group: u32,
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Contestant {
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub club: String,
    pub ageclass: String,
    pub bib: Option<u32>,
}

impl Contestant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One row of the sprint progression matrix, selected by contestant count.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RaceConfig {
    pub max_no_of_contestants: u32,
    /// Rounds this row actually runs, in running order, e.g. `["Q","S","F"]`.
    pub rounds: Vec<String>,
    /// round -> index -> number of heats.
    pub no_of_heats: BTreeMap<String, BTreeMap<String, u32>>,
    /// round -> index -> progression rule for each heat of that race.
    pub from_to: BTreeMap<String, BTreeMap<String, Rule>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionFormat {
    pub name: String,
    pub starting_order: Option<String>,
    pub start_procedure: Option<String>,
    pub time_between_groups: String,
    pub time_between_rounds: Option<String>,
    pub time_between_races: String,
    pub time_between_heats: Option<String>,
    pub intervals: Option<String>,
    pub max_no_of_contestants_in_raceclass: u32,
    pub max_no_of_contestants_in_race: u32,
    pub rounds_ranked_classes: Option<Vec<String>>,
    pub rounds_non_ranked_classes: Option<Vec<String>>,
    pub race_config_ranked: Option<Vec<RaceConfig>>,
    pub race_config_non_ranked: Option<Vec<RaceConfig>>,
}

impl CompetitionFormat {
    pub fn group_gap(&self) -> Result<Duration> {
        parse_hms(&self.time_between_groups)
    }

    pub fn race_gap(&self) -> Result<Duration> {
        parse_hms(&self.time_between_races)
    }

    pub fn round_gap(&self) -> Result<Duration> {
        match &self.time_between_rounds {
            Some(t) => parse_hms(t),
            None => Err(StorageError::IllegalValue(format!(
                "Competition format \"{}\" is missing the \"time_between_rounds\" property.",
                self.name
            ))),
        }
    }

    /// Gap between heats of the same round; falls back to `time_between_races`.
    pub fn heat_gap(&self) -> Result<Duration> {
        match &self.time_between_heats {
            Some(t) => parse_hms(t),
            None => self.race_gap(),
        }
    }

    pub fn start_interval(&self) -> Result<Duration> {
        match &self.intervals {
            Some(t) => parse_hms(t),
            None => Err(StorageError::IllegalValue(format!(
                "Competition format \"{}\" is missing the \"intervals\" property.",
                self.name
            ))),
        }
    }
}

/// The competition formats the raceplan generator can dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    IntervalStart,
    IndividualSprint,
    MassStart,
    Skiathlon,
    Pursuit,
    TeamSprint,
    Relay,
}

impl FormatKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Interval Start" => Some(FormatKind::IntervalStart),
            "Individual Sprint" => Some(FormatKind::IndividualSprint),
            "Mass Start" => Some(FormatKind::MassStart),
            "Skiathlon" => Some(FormatKind::Skiathlon),
            "Pursuit" => Some(FormatKind::Pursuit),
            "Team Sprint" => Some(FormatKind::TeamSprint),
            "Relay" => Some(FormatKind::Relay),
            _ => None,
        }
    }
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| StorageError::IllegalValue(format!("Time \"{s}\" has invalid format.")))
}

/// Parse a `HH:MM:SS` duration string.
pub fn parse_hms(s: &str) -> Result<Duration> {
    let time = parse_time(s)?;
    Ok(time - NaiveTime::from_hms_opt(0, 0, 0).expect("midnight"))
}
