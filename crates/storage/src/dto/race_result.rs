use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{RaceResult, TimeEvent};

/// A race-result with its ranking sequence hydrated, best rank first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RaceResultDetail {
    pub id: Uuid,
    pub race_id: Uuid,
    pub timing_point: String,
    pub no_of_contestants: u32,
    pub ranking_sequence: Vec<TimeEvent>,
}

impl RaceResultDetail {
    pub fn new(race_result: RaceResult, ranking_sequence: Vec<TimeEvent>) -> Self {
        Self {
            id: race_result.id,
            race_id: race_result.race_id,
            timing_point: race_result.timing_point,
            no_of_contestants: race_result.no_of_contestants,
            ranking_sequence,
        }
    }
}
