use anyhow::{Context, Result};

/// Process configuration, read from the environment. Each external service
/// is addressed by a host/port pair.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub events_host: String,
    pub events_port: u16,
    pub competition_format_host: String,
    pub competition_format_port: u16,
    pub users_host: String,
    pub users_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a number")?,
            events_host: std::env::var("EVENTS_HOST_SERVER")
                .context("Cannot load EVENTS_HOST_SERVER env variable")?,
            events_port: std::env::var("EVENTS_HOST_PORT")
                .context("Cannot load EVENTS_HOST_PORT env variable")?
                .parse()
                .context("EVENTS_HOST_PORT must be a number")?,
            competition_format_host: std::env::var("COMPETITION_FORMAT_HOST_SERVER")
                .context("Cannot load COMPETITION_FORMAT_HOST_SERVER env variable")?,
            competition_format_port: std::env::var("COMPETITION_FORMAT_HOST_PORT")
                .context("Cannot load COMPETITION_FORMAT_HOST_PORT env variable")?
                .parse()
                .context("COMPETITION_FORMAT_HOST_PORT must be a number")?,
            users_host: std::env::var("USERS_HOST_SERVER")
                .context("Cannot load USERS_HOST_SERVER env variable")?,
            users_port: std::env::var("USERS_HOST_PORT")
                .context("Cannot load USERS_HOST_PORT env variable")?
                .parse()
                .context("USERS_HOST_PORT must be a number")?,
        })
    }
}
