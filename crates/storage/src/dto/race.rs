use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Race, RaceVariant, StartEntry};

use super::race_result::RaceResultDetail;

/// Request payload for creating a race outside plan generation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRaceRequest {
    #[validate(length(min = 1, message = "raceclass must not be empty"))]
    pub raceclass: String,

    #[validate(range(min = 1, message = "order must be >= 1"))]
    pub order: u32,

    pub start_time: NaiveDateTime,

    #[validate(range(min = 1, message = "max_no_of_contestants must be >= 1"))]
    pub max_no_of_contestants: u32,

    #[serde(default)]
    pub no_of_contestants: u32,

    #[validate(length(min = 1, message = "event_id must not be empty"))]
    pub event_id: String,

    pub raceplan_id: Uuid,

    #[serde(flatten)]
    pub variant: RaceVariant,
}

impl CreateRaceRequest {
    pub fn into_race(self) -> Race {
        Race {
            id: Uuid::new_v4(),
            raceclass: self.raceclass,
            order: self.order,
            start_time: self.start_time,
            max_no_of_contestants: self.max_no_of_contestants,
            no_of_contestants: self.no_of_contestants,
            event_id: self.event_id,
            raceplan_id: self.raceplan_id,
            start_entries: Vec::new(),
            results: BTreeMap::new(),
            variant: self.variant,
        }
    }
}

/// A race with start-entries (sorted on starting position) and race-results
/// hydrated. Template results are internal and not exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RaceDetailResponse {
    pub id: Uuid,
    pub raceclass: String,
    pub order: u32,
    pub start_time: NaiveDateTime,
    pub max_no_of_contestants: u32,
    pub no_of_contestants: u32,
    pub event_id: String,
    pub raceplan_id: Uuid,
    pub start_entries: Vec<StartEntry>,
    pub results: BTreeMap<String, RaceResultDetail>,
    #[serde(flatten)]
    pub variant: RaceVariant,
}

impl RaceDetailResponse {
    pub fn new(
        race: Race,
        mut start_entries: Vec<StartEntry>,
        results: BTreeMap<String, RaceResultDetail>,
    ) -> Self {
        start_entries.sort_by_key(|entry| entry.starting_position);
        Self {
            id: race.id,
            raceclass: race.raceclass,
            order: race.order,
            start_time: race.start_time,
            max_no_of_contestants: race.max_no_of_contestants,
            no_of_contestants: race.no_of_contestants,
            event_id: race.event_id,
            raceplan_id: race.raceplan_id,
            start_entries,
            results,
            variant: race.variant,
        }
    }
}
