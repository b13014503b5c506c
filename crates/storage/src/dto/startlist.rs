use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{StartEntry, Startlist};

/// A startlist with its start-entries hydrated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartlistDetailResponse {
    pub id: Uuid,
    pub event_id: String,
    pub no_of_contestants: u32,
    pub start_entries: Vec<StartEntry>,
}

impl StartlistDetailResponse {
    pub fn new(startlist: Startlist, start_entries: Vec<StartEntry>) -> Self {
        Self {
            id: startlist.id,
            event_id: startlist.event_id,
            no_of_contestants: startlist.no_of_contestants,
            start_entries,
        }
    }
}
