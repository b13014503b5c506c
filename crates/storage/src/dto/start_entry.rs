use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{StartEntry, StartEntryStatus};

/// Request payload for adding a single start-entry to a race, e.g. a late
/// registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStartEntryRequest {
    pub race_id: Uuid,

    pub startlist_id: Option<Uuid>,

    #[validate(range(min = 1, message = "bib must be >= 1"))]
    pub bib: u32,

    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    #[serde(default)]
    pub club: String,

    #[validate(range(min = 1, message = "starting_position must be >= 1"))]
    pub starting_position: u32,

    pub scheduled_start_time: NaiveDateTime,

    #[serde(default)]
    pub status: StartEntryStatus,
}

impl CreateStartEntryRequest {
    pub fn into_start_entry(self) -> StartEntry {
        StartEntry {
            id: Uuid::new_v4(),
            race_id: self.race_id,
            startlist_id: self.startlist_id,
            bib: self.bib,
            name: self.name,
            club: self.club,
            starting_position: self.starting_position,
            scheduled_start_time: self.scheduled_start_time,
            actual_start_time: None,
            status: self.status,
            changelog: Vec::new(),
        }
    }
}
