use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use adapters::{CompetitionFormatsClient, EventsClient, UsersClient};
use anyhow::Context;
use storage::Database;
use utoipa::OpenApi;

mod config;
mod error;
mod features;
mod middleware;

#[cfg(test)]
mod tests;

use config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::health::ping,
        features::health::ready,
        features::raceplans::handlers::list_raceplans,
        features::raceplans::handlers::get_raceplan,
        features::raceplans::handlers::create_raceplan,
        features::raceplans::handlers::update_raceplan,
        features::raceplans::handlers::delete_raceplan,
        features::raceplans::handlers::generate_raceplan_for_event,
        features::raceplans::handlers::validate_raceplan,
        features::races::handlers::list_races,
        features::races::handlers::get_race,
        features::races::handlers::create_race,
        features::races::handlers::update_race,
        features::races::handlers::delete_race,
        features::start_entries::handlers::list_start_entries,
        features::start_entries::handlers::get_start_entry,
        features::start_entries::handlers::create_start_entry,
        features::start_entries::handlers::update_start_entry,
        features::start_entries::handlers::delete_start_entry,
        features::race_results::handlers::list_race_results,
        features::race_results::handlers::get_race_result,
        features::race_results::handlers::update_race_result,
        features::race_results::handlers::delete_race_result,
        features::startlists::handlers::list_startlists,
        features::startlists::handlers::get_startlist,
        features::startlists::handlers::create_startlist,
        features::startlists::handlers::update_startlist,
        features::startlists::handlers::delete_startlist,
        features::startlists::handlers::generate_startlist_for_event,
        features::time_events::handlers::list_time_events,
        features::time_events::handlers::get_time_event,
        features::time_events::handlers::create_time_event,
        features::time_events::handlers::update_time_event,
        features::time_events::handlers::delete_time_event,
    ),
    components(
        schemas(
            storage::models::Raceplan,
            storage::models::Race,
            storage::models::RaceVariant,
            storage::models::RaceResult,
            storage::models::Startlist,
            storage::models::StartEntry,
            storage::models::StartEntryStatus,
            storage::models::TimeEvent,
            storage::models::TimeEventStatus,
            storage::models::Changelog,
            storage::dto::raceplan::CreateRaceplanRequest,
            storage::dto::raceplan::RaceplanDetailResponse,
            storage::dto::race::CreateRaceRequest,
            storage::dto::race::RaceDetailResponse,
            storage::dto::race_result::RaceResultDetail,
            storage::dto::start_entry::CreateStartEntryRequest,
            storage::dto::startlist::StartlistDetailResponse,
            storage::dto::time_event::CreateTimeEventRequest,
            features::raceplans::handlers::GenerateRaceplanRequest,
            features::startlists::handlers::GenerateStartlistRequest,
            features::startlists::handlers::CreateStartlistRequest,
        )
    ),
    tags(
        (name = "raceplans", description = "Raceplan resources and generation"),
        (name = "races", description = "Race resources"),
        (name = "start-entries", description = "Start-entries per race"),
        (name = "race-results", description = "Race-results per race and timing point"),
        (name = "startlists", description = "Startlist resources and generation"),
        (name = "time-events", description = "Timing observations"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> HttpResponse {
    HttpResponse::Ok().json(doc.as_ref())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .init();

    tracing::info!("Starting race-backend");

    let config = Config::from_env().context("Failed to load configuration")?;

    let db = web::Data::new(Database::new());
    let events = web::Data::new(EventsClient::new(&config.events_host, config.events_port));
    let formats = web::Data::new(CompetitionFormatsClient::new(
        &config.competition_format_host,
        config.competition_format_port,
    ));
    let users = web::Data::new(UsersClient::new(&config.users_host, config.users_port));
    let openapi = web::Data::new(ApiDoc::openapi());

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db.clone())
            .app_data(events.clone())
            .app_data(formats.clone())
            .app_data(users.clone())
            .app_data(openapi.clone())
            .route("/api-docs/openapi.json", web::get().to(openapi_json))
            .configure(features::health::configure)
            .configure(features::raceplans::routes::configure)
            .configure(features::races::routes::configure)
            .configure(features::startlists::routes::configure)
            .configure(features::time_events::routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
