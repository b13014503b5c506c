use actix_web::{http::header, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use adapters::{CompetitionFormatsClient, EventsClient};
use serde::Deserialize;
use storage::models::Startlist;
use storage::repository::StartlistsRepository;
use storage::services::StartlistsService;
use storage::Database;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebResult;

use super::services;

#[derive(Debug, Deserialize)]
pub struct StartlistFilter {
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateStartlistRequest {
    #[validate(length(min = 1, message = "event_id must not be empty"))]
    pub event_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStartlistRequest {
    #[validate(length(min = 1, message = "event_id must not be empty"))]
    pub event_id: String,

    #[serde(default)]
    pub no_of_contestants: u32,
}

/// List startlists, optionally for a single event
#[utoipa::path(
    get,
    path = "/startlists",
    params(("eventId" = Option<String>, Query, description = "Filter on event id")),
    responses((status = 200, description = "Startlists", body = Vec<Startlist>)),
    tag = "startlists"
)]
pub async fn list_startlists(
    db: web::Data<Database>,
    filter: web::Query<StartlistFilter>,
) -> WebResult<HttpResponse> {
    let repo = StartlistsRepository::new(&db);
    let startlists = match &filter.event_id {
        Some(event_id) => repo.find_by_event_id(event_id).await?,
        None => repo.list().await?,
    };
    Ok(HttpResponse::Ok().json(startlists))
}

/// Get a startlist with its start-entries hydrated
#[utoipa::path(
    get,
    path = "/startlists/{id}",
    params(("id" = Uuid, Path, description = "Startlist id")),
    responses(
        (status = 200, description = "Startlist found", body = storage::dto::startlist::StartlistDetailResponse),
        (status = 404, description = "Startlist not found")
    ),
    tag = "startlists"
)]
pub async fn get_startlist(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    let detail = services::get_startlist_detail(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Create an empty startlist
#[utoipa::path(
    post,
    path = "/startlists",
    request_body = CreateStartlistRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Startlist created"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Event already has a startlist")
    ),
    tag = "startlists"
)]
pub async fn create_startlist(
    db: web::Data<Database>,
    payload: web::Json<CreateStartlistRequest>,
) -> WebResult<HttpResponse> {
    let request = payload.into_inner();
    request.validate()?;

    let startlist = Startlist {
        id: Uuid::new_v4(),
        event_id: request.event_id,
        no_of_contestants: request.no_of_contestants,
        start_entries: Vec::new(),
    };
    let id = StartlistsService::create_startlist(&db, startlist).await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/startlists/{id}")))
        .finish())
}

/// Replace a startlist document
#[utoipa::path(
    put,
    path = "/startlists/{id}",
    params(("id" = Uuid, Path, description = "Startlist id")),
    request_body = Startlist,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Startlist updated"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Startlist not found"),
        (status = 422, description = "Illegal value")
    ),
    tag = "startlists"
)]
pub async fn update_startlist(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
    payload: web::Json<Startlist>,
) -> WebResult<HttpResponse> {
    StartlistsService::update_startlist(&db, path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a startlist and its start-entries
#[utoipa::path(
    delete,
    path = "/startlists/{id}",
    params(("id" = Uuid, Path, description = "Startlist id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Startlist deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Startlist not found")
    ),
    tag = "startlists"
)]
pub async fn delete_startlist(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    services::delete_startlist(&db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Generate the startlist for an event
#[utoipa::path(
    post,
    path = "/startlists/generate-startlist-for-event",
    request_body = GenerateStartlistRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Startlist generated"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event already has a startlist"),
        (status = 422, description = "Unsupported input")
    ),
    tag = "startlists"
)]
pub async fn generate_startlist_for_event(
    db: web::Data<Database>,
    events: web::Data<EventsClient>,
    formats: web::Data<CompetitionFormatsClient>,
    credentials: BearerAuth,
    payload: web::Json<GenerateStartlistRequest>,
) -> WebResult<HttpResponse> {
    let request = payload.into_inner();
    request.validate()?;

    let id = services::generate_startlist_for_event(
        &db,
        &events,
        &formats,
        credentials.token(),
        &request.event_id,
    )
    .await?;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/startlists/{id}")))
        .finish())
}
