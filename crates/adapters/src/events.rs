use storage::models::{Contestant, Event, Raceclass};

use crate::error::{AdapterError, Result};

/// Client for the events service, which owns events, raceclasses and
/// contestants (including bib assignment).
#[derive(Clone)]
pub struct EventsClient {
    base_url: String,
    client: reqwest::Client,
}

impl EventsClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            base_url: format!("http://{host}:{port}"),
            client: reqwest::Client::new(),
        }
    }

    pub async fn get_event_by_id(&self, token: &str, event_id: &str) -> Result<Event> {
        let url = format!("{}/events/{event_id}", self.base_url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        match response.status().as_u16() {
            200 => Ok(response.json::<Event>().await?),
            404 => Err(AdapterError::NotFound(format!(
                "Event {event_id} not found."
            ))),
            status => Err(AdapterError::Upstream {
                service: "events",
                status,
            }),
        }
    }

    pub async fn get_raceclasses(&self, token: &str, event_id: &str) -> Result<Vec<Raceclass>> {
        let url = format!("{}/events/{event_id}/raceclasses", self.base_url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        match response.status().as_u16() {
            200 => Ok(response.json::<Vec<Raceclass>>().await?),
            404 => Err(AdapterError::NotFound(format!(
                "No raceclasses found for event {event_id}."
            ))),
            status => Err(AdapterError::Upstream {
                service: "events",
                status,
            }),
        }
    }

    pub async fn get_contestants(&self, token: &str, event_id: &str) -> Result<Vec<Contestant>> {
        let url = format!("{}/events/{event_id}/contestants", self.base_url);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        match response.status().as_u16() {
            200 => Ok(response.json::<Vec<Contestant>>().await?),
            404 => Err(AdapterError::NotFound(format!(
                "No contestants found for event {event_id}."
            ))),
            status => Err(AdapterError::Upstream {
                service: "events",
                status,
            }),
        }
    }
}
