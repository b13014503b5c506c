use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use storage::dto::start_entry::CreateStartEntryRequest;
use storage::models::StartEntry;
use storage::repository::StartEntriesRepository;
use storage::Database;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebResult;

use super::services;

#[derive(Debug, Deserialize)]
pub struct StartEntryFilter {
    #[serde(rename = "startlistId")]
    pub startlist_id: Option<Uuid>,
}

/// List the start-entries of a race
#[utoipa::path(
    get,
    path = "/races/{raceId}/start-entries",
    params(
        ("raceId" = Uuid, Path, description = "Race id"),
        ("startlistId" = Option<Uuid>, Query, description = "Filter on startlist id")
    ),
    responses((status = 200, description = "Start-entries", body = Vec<StartEntry>)),
    tag = "start-entries"
)]
pub async fn list_start_entries(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
    filter: web::Query<StartEntryFilter>,
) -> WebResult<HttpResponse> {
    let race_id = path.into_inner();
    let repo = StartEntriesRepository::new(&db);
    let entries = match filter.startlist_id {
        Some(startlist_id) => {
            repo.find_by_race_id_and_startlist_id(race_id, startlist_id)
                .await?
        }
        None => repo.find_by_race_id(race_id).await?,
    };
    Ok(HttpResponse::Ok().json(entries))
}

/// Get a single start-entry
#[utoipa::path(
    get,
    path = "/races/{raceId}/start-entries/{id}",
    params(
        ("raceId" = Uuid, Path, description = "Race id"),
        ("id" = Uuid, Path, description = "Start-entry id")
    ),
    responses(
        (status = 200, description = "Start-entry found", body = StartEntry),
        (status = 404, description = "Start-entry not found")
    ),
    tag = "start-entries"
)]
pub async fn get_start_entry(
    db: web::Data<Database>,
    path: web::Path<(Uuid, Uuid)>,
) -> WebResult<HttpResponse> {
    let (race_id, id) = path.into_inner();
    let entry = services::get_start_entry(&db, race_id, id).await?;
    Ok(HttpResponse::Ok().json(entry))
}

/// Add a start-entry to a race
#[utoipa::path(
    post,
    path = "/races/{raceId}/start-entries",
    params(("raceId" = Uuid, Path, description = "Race id")),
    request_body = CreateStartEntryRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Start-entry created"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race not found"),
        (status = 409, description = "Race full, bib or position taken"),
        (status = 422, description = "Illegal value")
    ),
    tag = "start-entries"
)]
pub async fn create_start_entry(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
    payload: web::Json<CreateStartEntryRequest>,
) -> WebResult<HttpResponse> {
    let race_id = path.into_inner();
    let request = payload.into_inner();
    request.validate()?;

    let id = services::create_start_entry(&db, race_id, request).await?;
    Ok(HttpResponse::Created()
        .insert_header((
            header::LOCATION,
            format!("/races/{race_id}/start-entries/{id}"),
        ))
        .finish())
}

/// Replace a start-entry document
#[utoipa::path(
    put,
    path = "/races/{raceId}/start-entries/{id}",
    params(
        ("raceId" = Uuid, Path, description = "Race id"),
        ("id" = Uuid, Path, description = "Start-entry id")
    ),
    request_body = StartEntry,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Start-entry updated"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Start-entry not found"),
        (status = 422, description = "Illegal value")
    ),
    tag = "start-entries"
)]
pub async fn update_start_entry(
    db: web::Data<Database>,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<StartEntry>,
) -> WebResult<HttpResponse> {
    let (race_id, id) = path.into_inner();
    services::update_start_entry(&db, race_id, id, payload.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a start-entry
#[utoipa::path(
    delete,
    path = "/races/{raceId}/start-entries/{id}",
    params(
        ("raceId" = Uuid, Path, description = "Race id"),
        ("id" = Uuid, Path, description = "Start-entry id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Start-entry deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Start-entry not found")
    ),
    tag = "start-entries"
)]
pub async fn delete_start_entry(
    db: web::Data<Database>,
    path: web::Path<(Uuid, Uuid)>,
) -> WebResult<HttpResponse> {
    let (race_id, id) = path.into_inner();
    services::delete_start_entry(&db, race_id, id).await?;
    Ok(HttpResponse::NoContent().finish())
}
