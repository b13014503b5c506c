pub mod race_results;
pub mod raceplans;
pub mod races;
pub mod start_entries;
pub mod startlists;
pub mod time_events;

pub use race_results::RaceResultsRepository;
pub use raceplans::RaceplansRepository;
pub use races::RacesRepository;
pub use start_entries::StartEntriesRepository;
pub use startlists::StartlistsRepository;
pub use time_events::TimeEventsRepository;
