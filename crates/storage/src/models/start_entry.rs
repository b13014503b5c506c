use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Changelog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum StartEntryStatus {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "DNS")]
    Dns,
    #[serde(rename = "DNF")]
    Dnf,
    #[serde(rename = "DSQ")]
    Dsq,
}

impl StartEntryStatus {
    /// DNS, DNF and DSQ contestants are out of progression.
    pub fn is_out(&self) -> bool {
        matches!(
            self,
            StartEntryStatus::Dns | StartEntryStatus::Dnf | StartEntryStatus::Dsq
        )
    }
}

/// One contestant's participation in one race.
///
/// First-round entries belong to the event startlist; entries in later
/// sprint rounds are derived by qualifier propagation and carry no
/// startlist reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartEntry {
    pub id: Uuid,
    pub race_id: Uuid,
    pub startlist_id: Option<Uuid>,
    pub bib: u32,
    pub name: String,
    pub club: String,
    pub starting_position: u32,
    pub scheduled_start_time: NaiveDateTime,
    pub actual_start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: StartEntryStatus,
    #[serde(default)]
    pub changelog: Vec<Changelog>,
}
