pub mod race_results;
pub mod raceclasses;
pub mod raceplan_fixed_start;
pub mod raceplan_individual_sprint;
pub mod raceplan_interval_start;
pub mod raceplans;
pub mod races;
pub mod start_entries;
pub mod startlist_entries;
pub mod startlists;
pub mod time_events;

#[cfg(test)]
pub(crate) mod test_support;

pub use race_results::RaceResultsService;
pub use raceplans::RaceplansService;
pub use races::RacesService;
pub use start_entries::StartEntriesService;
pub use startlists::StartlistsService;
pub use time_events::TimeEventsService;
