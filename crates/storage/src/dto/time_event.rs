use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{TimeEvent, TimeEventStatus};

/// Request payload for registering one timing observation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTimeEventRequest {
    #[validate(length(min = 1, message = "event_id must not be empty"))]
    pub event_id: String,

    pub race_id: Option<Uuid>,

    pub race: Option<String>,

    pub bib: Option<u32>,

    pub name: Option<String>,

    pub club: Option<String>,

    #[validate(length(min = 1, message = "timing_point must not be empty"))]
    pub timing_point: String,

    pub registration_time: NaiveDateTime,
}

impl CreateTimeEventRequest {
    pub fn into_time_event(self) -> TimeEvent {
        TimeEvent {
            id: Uuid::new_v4(),
            event_id: self.event_id,
            race_id: self.race_id,
            race: self.race,
            bib: self.bib,
            name: self.name,
            club: self.club,
            timing_point: self.timing_point,
            registration_time: self.registration_time,
            rank: None,
            next_race: None,
            next_race_id: None,
            next_race_position: None,
            status: TimeEventStatus::Ok,
            changelog: Vec::new(),
        }
    }
}
