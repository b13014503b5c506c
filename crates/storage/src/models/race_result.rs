use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The authoritative ordering of time-events at one timing point of one race.
/// At most one exists per `(race_id, timing_point)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RaceResult {
    pub id: Uuid,
    pub race_id: Uuid,
    pub timing_point: String,
    pub no_of_contestants: u32,
    /// References to time-events, best rank first.
    #[serde(default)]
    pub ranking_sequence: Vec<Uuid>,
}
