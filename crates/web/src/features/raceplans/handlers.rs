use actix_web::{http::header, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use adapters::{CompetitionFormatsClient, EventsClient};
use serde::Deserialize;
use storage::dto::raceplan::CreateRaceplanRequest;
use storage::models::Raceplan;
use storage::repository::RaceplansRepository;
use storage::services::RaceplansService;
use storage::Database;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebResult;

use super::services;

#[derive(Debug, Deserialize)]
pub struct RaceplanFilter {
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateRaceplanRequest {
    #[validate(length(min = 1, message = "event_id must not be empty"))]
    pub event_id: String,
}

/// List raceplans, optionally for a single event
#[utoipa::path(
    get,
    path = "/raceplans",
    params(("eventId" = Option<String>, Query, description = "Filter on event id")),
    responses((status = 200, description = "Raceplans", body = Vec<Raceplan>)),
    tag = "raceplans"
)]
pub async fn list_raceplans(
    db: web::Data<Database>,
    filter: web::Query<RaceplanFilter>,
) -> WebResult<HttpResponse> {
    let repo = RaceplansRepository::new(&db);
    let raceplans = match &filter.event_id {
        Some(event_id) => repo.find_by_event_id(event_id).await?,
        None => repo.list().await?,
    };
    Ok(HttpResponse::Ok().json(raceplans))
}

/// Get a raceplan with its races hydrated
#[utoipa::path(
    get,
    path = "/raceplans/{id}",
    params(("id" = Uuid, Path, description = "Raceplan id")),
    responses(
        (status = 200, description = "Raceplan found", body = storage::dto::raceplan::RaceplanDetailResponse),
        (status = 404, description = "Raceplan not found")
    ),
    tag = "raceplans"
)]
pub async fn get_raceplan(db: web::Data<Database>, path: web::Path<Uuid>) -> WebResult<HttpResponse> {
    let detail = services::get_raceplan_detail(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Create an empty raceplan
#[utoipa::path(
    post,
    path = "/raceplans",
    request_body = CreateRaceplanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Raceplan created"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Event already has a raceplan")
    ),
    tag = "raceplans"
)]
pub async fn create_raceplan(
    db: web::Data<Database>,
    payload: web::Json<CreateRaceplanRequest>,
) -> WebResult<HttpResponse> {
    let request = payload.into_inner();
    request.validate()?;

    let id = RaceplansService::create_raceplan(&db, request.into_raceplan()).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/raceplans/{id}")))
        .finish())
}

/// Replace a raceplan document
#[utoipa::path(
    put,
    path = "/raceplans/{id}",
    params(("id" = Uuid, Path, description = "Raceplan id")),
    request_body = Raceplan,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Raceplan updated"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Raceplan not found"),
        (status = 422, description = "Illegal value")
    ),
    tag = "raceplans"
)]
pub async fn update_raceplan(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
    payload: web::Json<Raceplan>,
) -> WebResult<HttpResponse> {
    RaceplansService::update_raceplan(&db, path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a raceplan and all races in it
#[utoipa::path(
    delete,
    path = "/raceplans/{id}",
    params(("id" = Uuid, Path, description = "Raceplan id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Raceplan deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Raceplan not found")
    ),
    tag = "raceplans"
)]
pub async fn delete_raceplan(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    services::delete_raceplan(&db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Generate the raceplan for an event
#[utoipa::path(
    post,
    path = "/raceplans/generate-raceplan-for-event",
    request_body = GenerateRaceplanRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Raceplan generated"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event already has a raceplan"),
        (status = 422, description = "Unsupported input")
    ),
    tag = "raceplans"
)]
pub async fn generate_raceplan_for_event(
    db: web::Data<Database>,
    events: web::Data<EventsClient>,
    formats: web::Data<CompetitionFormatsClient>,
    credentials: BearerAuth,
    payload: web::Json<GenerateRaceplanRequest>,
) -> WebResult<HttpResponse> {
    let request = payload.into_inner();
    request.validate()?;

    let id = services::generate_raceplan_for_event(
        &db,
        &events,
        &formats,
        credentials.token(),
        &request.event_id,
    )
    .await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/raceplans/{id}")))
        .finish())
}

/// Validate a raceplan against its event and raceclasses
#[utoipa::path(
    post,
    path = "/raceplans/{id}/validate",
    params(("id" = Uuid, Path, description = "Raceplan id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Validation findings per race order"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Raceplan not found")
    ),
    tag = "raceplans"
)]
pub async fn validate_raceplan(
    db: web::Data<Database>,
    events: web::Data<EventsClient>,
    formats: web::Data<CompetitionFormatsClient>,
    credentials: BearerAuth,
    path: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    let findings = services::validate_raceplan(
        &db,
        &events,
        &formats,
        credentials.token(),
        path.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(findings))
}
