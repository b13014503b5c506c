use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The complete schedule of races for one event. One per event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Raceplan {
    pub id: Uuid,
    pub event_id: String,
    pub no_of_contestants: u32,
    /// Ids of every race in this plan, in emission order.
    #[serde(default)]
    pub races: Vec<Uuid>,
}
