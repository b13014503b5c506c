use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Changelog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum TimeEventStatus {
    #[default]
    #[serde(rename = "OK")]
    Ok,
    Error,
}

/// One timing observation at a timing point.
///
/// Append-only; corrections go through deletion and re-posting. A finish
/// event that qualified its contestant for a later round carries the
/// `next_race*` fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeEvent {
    pub id: Uuid,
    pub event_id: String,
    pub race_id: Option<Uuid>,
    pub race: Option<String>,
    pub bib: Option<u32>,
    pub name: Option<String>,
    pub club: Option<String>,
    pub timing_point: String,
    pub registration_time: NaiveDateTime,
    pub rank: Option<u32>,
    pub next_race: Option<String>,
    pub next_race_id: Option<Uuid>,
    pub next_race_position: Option<u32>,
    #[serde(default)]
    pub status: TimeEventStatus,
    #[serde(default)]
    pub changelog: Vec<Changelog>,
}
