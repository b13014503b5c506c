pub mod changelog;
pub mod event;
pub mod race;
pub mod race_result;
pub mod raceplan;
pub mod start_entry;
pub mod startlist;
pub mod time_event;

pub use changelog::Changelog;
pub use event::{CompetitionFormat, Contestant, Event, FormatKind, RaceConfig, Raceclass};
pub use race::{Race, RaceVariant, Rule, RuleKeyword, RuleQuota};
pub use race_result::RaceResult;
pub use raceplan::Raceplan;
pub use start_entry::{StartEntry, StartEntryStatus};
pub use startlist::Startlist;
pub use time_event::{TimeEvent, TimeEventStatus};
