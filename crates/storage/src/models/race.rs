use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Progression rule on a sprint heat: target round -> target index -> quota.
///
/// A `Q` heat in a 32-contestant class carries
/// `{"S": {"A": 4, "C": "REST"}}`: the top four advance to semifinal A,
/// everyone else drops to semifinal C.
pub type Rule = BTreeMap<String, BTreeMap<String, RuleQuota>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RuleQuota {
    Count(u32),
    Keyword(RuleKeyword),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleKeyword {
    /// Every contestant left in the heat after counted quotas are taken.
    Rest,
    /// Every contestant in the heat.
    All,
}

impl RuleQuota {
    pub fn is_counted(&self) -> bool {
        matches!(self, RuleQuota::Count(_))
    }
}

/// The two race document shapes, discriminated by `datatype` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "datatype", rename_all = "snake_case")]
pub enum RaceVariant {
    IntervalStart,
    IndividualSprint {
        round: String,
        index: String,
        heat: u32,
        #[serde(default)]
        rule: Rule,
    },
}

/// A single starting group; for the sprint format, one heat.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Race {
    pub id: Uuid,
    pub raceclass: String,
    pub order: u32,
    pub start_time: NaiveDateTime,
    pub max_no_of_contestants: u32,
    pub no_of_contestants: u32,
    pub event_id: String,
    pub raceplan_id: Uuid,
    /// References to the start-entries of this race.
    #[serde(default)]
    pub start_entries: Vec<Uuid>,
    /// Reference to the race-result per timing point.
    #[serde(default)]
    pub results: BTreeMap<String, Uuid>,
    #[serde(flatten)]
    pub variant: RaceVariant,
}

impl Race {
    pub fn is_sprint(&self) -> bool {
        matches!(self.variant, RaceVariant::IndividualSprint { .. })
    }

    pub fn round(&self) -> Option<&str> {
        match &self.variant {
            RaceVariant::IndividualSprint { round, .. } => Some(round),
            RaceVariant::IntervalStart => None,
        }
    }

    pub fn index(&self) -> Option<&str> {
        match &self.variant {
            RaceVariant::IndividualSprint { index, .. } => Some(index),
            RaceVariant::IntervalStart => None,
        }
    }

    pub fn heat(&self) -> Option<u32> {
        match &self.variant {
            RaceVariant::IndividualSprint { heat, .. } => Some(*heat),
            RaceVariant::IntervalStart => None,
        }
    }

    pub fn rule(&self) -> Option<&Rule> {
        match &self.variant {
            RaceVariant::IndividualSprint { rule, .. } => Some(rule),
            RaceVariant::IntervalStart => None,
        }
    }
}
