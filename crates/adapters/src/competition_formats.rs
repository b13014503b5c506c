use storage::models::CompetitionFormat;

use crate::error::{AdapterError, Result};

/// Client for the competition-format service catalog.
#[derive(Clone)]
pub struct CompetitionFormatsClient {
    base_url: String,
    client: reqwest::Client,
}

impl CompetitionFormatsClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            base_url: format!("http://{host}:{port}"),
            client: reqwest::Client::new(),
        }
    }

    /// Look a format up by name. The service answers with a list; the first
    /// entry wins.
    pub async fn get_by_name(&self, token: &str, name: &str) -> Result<CompetitionFormat> {
        let url = format!("{}/competition-formats", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("name", name)])
            .bearer_auth(token)
            .send()
            .await?;
        match response.status().as_u16() {
            200 => {
                let formats = response.json::<Vec<CompetitionFormat>>().await?;
                formats.into_iter().next().ok_or_else(|| {
                    AdapterError::NotFound(format!("CompetitionFormat \"{name}\" not found."))
                })
            }
            404 => Err(AdapterError::NotFound(format!(
                "CompetitionFormat \"{name}\" not found."
            ))),
            status => Err(AdapterError::Upstream {
                service: "competition-formats",
                status,
            }),
        }
    }
}
