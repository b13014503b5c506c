use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storage::dto::time_event::CreateTimeEventRequest;
use storage::models::TimeEvent;
use storage::repository::TimeEventsRepository;
use storage::services::TimeEventsService;
use storage::Database;
use uuid::Uuid;
use validator::Validate;

use crate::error::WebResult;

use super::services;

#[derive(Debug, Deserialize)]
pub struct TimeEventFilter {
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
    #[serde(rename = "timingPoint")]
    pub timing_point: Option<String>,
    pub bib: Option<u32>,
    #[serde(rename = "raceId")]
    pub race_id: Option<Uuid>,
}

/// List time-events, filtered on event, timing point, bib or race
#[utoipa::path(
    get,
    path = "/time-events",
    params(
        ("eventId" = Option<String>, Query, description = "Filter on event id"),
        ("timingPoint" = Option<String>, Query, description = "With eventId: filter on timing point"),
        ("bib" = Option<u32>, Query, description = "With eventId: filter on bib"),
        ("raceId" = Option<Uuid>, Query, description = "Filter on race id")
    ),
    responses((status = 200, description = "Time-events", body = Vec<TimeEvent>)),
    tag = "time-events"
)]
pub async fn list_time_events(
    db: web::Data<Database>,
    filter: web::Query<TimeEventFilter>,
) -> WebResult<HttpResponse> {
    let repo = TimeEventsRepository::new(&db);
    let time_events = if let Some(event_id) = &filter.event_id {
        if let Some(timing_point) = &filter.timing_point {
            repo.find_by_event_id_and_timing_point(event_id, timing_point)
                .await?
        } else if let Some(bib) = filter.bib {
            repo.find_by_event_id_and_bib(event_id, bib).await?
        } else {
            repo.find_by_event_id(event_id).await?
        }
    } else if let Some(race_id) = filter.race_id {
        repo.find_by_race_id(race_id).await?
    } else {
        repo.list().await?
    };
    Ok(HttpResponse::Ok().json(time_events))
}

/// Register a time-event from a timing point
#[utoipa::path(
    post,
    path = "/time-events",
    request_body = CreateTimeEventRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Time-event accepted", body = TimeEvent),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Duplicate observation"),
        (status = 422, description = "Rejected by processing; stored with status Error")
    ),
    tag = "time-events"
)]
pub async fn create_time_event(
    db: web::Data<Database>,
    payload: web::Json<CreateTimeEventRequest>,
) -> WebResult<HttpResponse> {
    let request = payload.into_inner();
    request.validate()?;

    let registered = services::register_time_event(&db, request.into_time_event()).await?;
    if !registered.accepted {
        let detail = registered
            .time_event
            .changelog
            .last()
            .map(|entry| entry.comment.clone())
            .unwrap_or_else(|| "Time-event could not be processed.".to_string());
        return Ok(HttpResponse::UnprocessableEntity().json(json!({ "detail": detail })));
    }

    let id = registered.time_event.id;
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/time-events/{id}")))
        .json(registered.time_event))
}

/// Get a single time-event
#[utoipa::path(
    get,
    path = "/time-events/{id}",
    params(("id" = Uuid, Path, description = "Time-event id")),
    responses(
        (status = 200, description = "Time-event found", body = TimeEvent),
        (status = 404, description = "Time-event not found")
    ),
    tag = "time-events"
)]
pub async fn get_time_event(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    let time_event = TimeEventsRepository::new(&db)
        .find_by_id(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(time_event))
}

/// Replace a time-event document
#[utoipa::path(
    put,
    path = "/time-events/{id}",
    params(("id" = Uuid, Path, description = "Time-event id")),
    request_body = TimeEvent,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Time-event updated"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Time-event not found"),
        (status = 422, description = "Illegal value")
    ),
    tag = "time-events"
)]
pub async fn update_time_event(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
    payload: web::Json<TimeEvent>,
) -> WebResult<HttpResponse> {
    TimeEventsService::update_time_event(&db, path.into_inner(), payload.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a time-event; its race-result is re-ranked and a propagated
/// start-entry withdrawn
#[utoipa::path(
    delete,
    path = "/time-events/{id}",
    params(("id" = Uuid, Path, description = "Time-event id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Time-event deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Time-event not found"),
        (status = 409, description = "Dependent time-events exist downstream")
    ),
    tag = "time-events"
)]
pub async fn delete_time_event(
    db: web::Data<Database>,
    path: web::Path<Uuid>,
) -> WebResult<HttpResponse> {
    services::delete_time_event(&db, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
