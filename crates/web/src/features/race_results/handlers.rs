use actix_web::{web, HttpResponse};
use serde::Deserialize;
use storage::models::RaceResult;
use storage::repository::RaceResultsRepository;
use storage::services::RaceResultsService;
use storage::Database;
use uuid::Uuid;

use crate::error::{WebError, WebResult};

use super::services;

#[derive(Debug, Deserialize)]
pub struct RaceResultFilter {
    #[serde(rename = "timingPoint")]
    pub timing_point: Option<String>,
    #[serde(rename = "idsOnly", default)]
    pub ids_only: bool,
}

/// List the race-results of a race
#[utoipa::path(
    get,
    path = "/races/{raceId}/race-results",
    params(
        ("raceId" = Uuid, Path, description = "Race id"),
        ("timingPoint" = Option<String>, Query, description = "Filter on timing point"),
        ("idsOnly" = Option<bool>, Query, description = "Return time-event references instead of documents")
    ),
    responses((status = 200, description = "Race-results", body = Vec<RaceResult>)),
    tag = "race-results"
)]
pub async fn list_race_results(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
    filter: web::Query<RaceResultFilter>,
) -> WebResult<HttpResponse> {
    let race_id = path.into_inner();
    let results =
        services::list_race_results(&db, race_id, filter.timing_point.as_deref()).await?;

    if filter.ids_only {
        return Ok(HttpResponse::Ok().json(results));
    }
    let mut details = Vec::with_capacity(results.len());
    for result in results {
        details.push(services::hydrate(&db, result).await?);
    }
    Ok(HttpResponse::Ok().json(details))
}

/// Get a single race-result with its ranking sequence hydrated
#[utoipa::path(
    get,
    path = "/races/{raceId}/race-results/{id}",
    params(
        ("raceId" = Uuid, Path, description = "Race id"),
        ("id" = Uuid, Path, description = "Race-result id")
    ),
    responses(
        (status = 200, description = "Race-result found", body = storage::dto::race_result::RaceResultDetail),
        (status = 404, description = "Race-result not found")
    ),
    tag = "race-results"
)]
pub async fn get_race_result(
    db: web::Data<Database>,
    path: web::Path<(Uuid, Uuid)>,
) -> WebResult<HttpResponse> {
    let (race_id, id) = path.into_inner();
    let race_result = RaceResultsRepository::new(&db).find_by_id(id).await?;
    if race_result.race_id != race_id {
        return Err(WebError::NotFound(format!(
            "Race-result {id} not found in race {race_id}."
        )));
    }
    Ok(HttpResponse::Ok().json(services::hydrate(&db, race_result).await?))
}

/// Replace a race-result document
#[utoipa::path(
    put,
    path = "/races/{raceId}/race-results/{id}",
    params(
        ("raceId" = Uuid, Path, description = "Race id"),
        ("id" = Uuid, Path, description = "Race-result id")
    ),
    request_body = RaceResult,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Race-result updated"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race-result not found"),
        (status = 422, description = "Illegal value")
    ),
    tag = "race-results"
)]
pub async fn update_race_result(
    db: web::Data<Database>,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<RaceResult>,
) -> WebResult<HttpResponse> {
    let (_race_id, id) = path.into_inner();
    RaceResultsService::update_race_result(&db, id, payload.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a race-result
#[utoipa::path(
    delete,
    path = "/races/{raceId}/race-results/{id}",
    params(
        ("raceId" = Uuid, Path, description = "Race id"),
        ("id" = Uuid, Path, description = "Race-result id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Race-result deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Race-result not found")
    ),
    tag = "race-results"
)]
pub async fn delete_race_result(
    db: web::Data<Database>,
    path: web::Path<(Uuid, Uuid)>,
) -> WebResult<HttpResponse> {
    let (_race_id, id) = path.into_inner();
    RaceResultsService::delete_race_result(&db, id).await?;
    Ok(HttpResponse::NoContent().finish())
}
