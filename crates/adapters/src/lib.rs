//! HTTP clients for the external collaborators: the events service, the
//! competition-format service, and the users service.

pub mod competition_formats;
pub mod error;
pub mod events;
pub mod users;

pub use competition_formats::CompetitionFormatsClient;
pub use error::{AdapterError, Result};
pub use events::EventsClient;
pub use users::UsersClient;
