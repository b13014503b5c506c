use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The first-round roster for an event. One per event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Startlist {
    pub id: Uuid,
    pub event_id: String,
    pub no_of_contestants: u32,
    #[serde(default)]
    pub start_entries: Vec<Uuid>,
}
