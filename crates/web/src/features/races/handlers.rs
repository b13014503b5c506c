use actix_web::{http::header, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use adapters::{CompetitionFormatsClient, EventsClient};
use serde::Deserialize;
use storage::dto::race::CreateRaceRequest;
use storage::models::Race;
use storage::repository::RacesRepository;
use storage::Database;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebResult;

use super::services;

#[derive(Debug, Deserialize)]
pub struct RaceFilter {
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
    pub raceclass: Option<String>,
}

/// List races, optionally for one event or one raceclass
#[utoipa::path(
    get,
    path = "/races",
    params(
        ("eventId" = Option<String>, Query, description = "Filter on event id"),
        ("raceclass" = Option<String>, Query, description = "Filter on raceclass; hydrates the races")
    ),
    responses((status = 200, description = "Races", body = Vec<Race>)),
    tag = "races"
)]
pub async fn list_races(
    db: web::Data<Database>,
    filter: web::Query<RaceFilter>,
) -> WebResult<HttpResponse> {
    let repo = RacesRepository::new(&db);
    match (&filter.event_id, &filter.raceclass) {
        (Some(event_id), Some(raceclass)) => {
            let details =
                services::get_race_details_by_raceclass(&db, event_id, raceclass).await?;
            Ok(HttpResponse::Ok().json(details))
        }
        (Some(event_id), None) => {
            Ok(HttpResponse::Ok().json(repo.find_by_event_id(event_id).await?))
        }
        _ => Ok(HttpResponse::Ok().json(repo.list().await?)),
    }
}

/// Get a race with start-entries and results hydrated
#[utoipa::path(
    get,
    path = "/races/{id}",
    params(("id" = Uuid, Path, description = "Race id")),
    responses(
        (status = 200, description = "Race found", body = storage::dto::race::RaceDetailResponse),
        (status = 404, description = "Race not found")
    ),
    tag = "races"
)]
pub async fn get_race(db: web::Data<Database>, path: web::Path<Uuid>) -> WebResult<HttpResponse> {
    let detail = services::get_race_detail(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Create a race in an existing raceplan
#[utoipa::path(
    post,
    path = "/races",
    request_body = CreateRaceRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Race created"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Raceplan not found"),
        (status = 422, description = "Illegal value")
    ),
    tag = "races"
)]
pub async fn create_race(
    db: web::Data<Database>,
    payload: web::Json<CreateRaceRequest>,
) -> WebResult<HttpResponse> {
    let request = payload.into_inner();
    request.validate()?;

    let id = services::create_race(&db, request.into_race()).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/races/{id}")))
        .finish())
}

/// Replace a race document
#[utoipa::path(
    put,
    path = "/races/{id}",
    params(("id" = Uuid, Path, description = "Race id")),
    request_body = Race,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Race updated"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found"),
        (status = 422, description = "Illegal value")
    ),
    tag = "races"
)]
pub async fn update_race(
    db: web::Data<Database>,
    events: web::Data<EventsClient>,
    formats: web::Data<CompetitionFormatsClient>,
    credentials: BearerAuth,
    path: web::Path<Uuid>,
    payload: web::Json<Race>,
) -> WebResult<HttpResponse> {
    services::update_race(
        &db,
        &events,
        &formats,
        credentials.token(),
        path.into_inner(),
        payload.into_inner(),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a race with its start-entries and results
#[utoipa::path(
    delete,
    path = "/races/{id}",
    params(("id" = Uuid, Path, description = "Race id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Race deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found")
    ),
    tag = "races"
)]
pub async fn delete_race(db: web::Data<Database>, path: web::Path<Uuid>) -> WebResult<HttpResponse> {
    services::delete_race(&db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
