use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Race, Raceplan};

/// Request payload for creating a raceplan by hand. The usual path is the
/// generate-raceplan-for-event command.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRaceplanRequest {
    #[validate(length(min = 1, message = "event_id must not be empty"))]
    pub event_id: String,

    #[serde(default)]
    pub no_of_contestants: u32,
}

impl CreateRaceplanRequest {
    pub fn into_raceplan(self) -> Raceplan {
        Raceplan {
            id: Uuid::new_v4(),
            event_id: self.event_id,
            no_of_contestants: self.no_of_contestants,
            races: Vec::new(),
        }
    }
}

/// A raceplan with its race references replaced by the race documents,
/// sorted on running order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RaceplanDetailResponse {
    pub id: Uuid,
    pub event_id: String,
    pub no_of_contestants: u32,
    pub races: Vec<Race>,
}

impl RaceplanDetailResponse {
    pub fn new(raceplan: Raceplan, mut races: Vec<Race>) -> Self {
        races.sort_by_key(|race| race.order);
        Self {
            id: raceplan.id,
            event_id: raceplan.event_id,
            no_of_contestants: raceplan.no_of_contestants,
            races,
        }
    }
}
