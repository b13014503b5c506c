use crate::error::{AdapterError, Result};

/// Client for the users service; only used to validate bearer tokens.
/// No user data ever crosses this boundary.
#[derive(Clone)]
pub struct UsersClient {
    base_url: String,
    client: reqwest::Client,
}

impl UsersClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            base_url: format!("http://{host}:{port}"),
            client: reqwest::Client::new(),
        }
    }

    pub async fn authorize(&self, token: &str) -> Result<()> {
        let url = format!("{}/authorize", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;
        match response.status().as_u16() {
            204 => Ok(()),
            401 => Err(AdapterError::Unauthorized),
            403 => Err(AdapterError::Forbidden),
            status => {
                tracing::error!(status, "unexpected status from users service");
                Err(AdapterError::Upstream {
                    service: "users",
                    status,
                })
            }
        }
    }
}
