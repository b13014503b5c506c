use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One append-only audit line on a start-entry or time-event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Changelog {
    pub timestamp: NaiveDateTime,
    pub user_id: String,
    pub comment: String,
}

impl Changelog {
    pub fn new(user_id: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().naive_utc(),
            user_id: user_id.into(),
            comment: comment.into(),
        }
    }
}
