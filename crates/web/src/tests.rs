//! Routing and error-mapping coverage for the read surface. The write
//! surface goes through bearer authentication against the users service and
//! is covered by the service-level tests in the storage crate.

use actix_web::{test, web, App};
use chrono::NaiveDateTime;
use storage::models::{Race, RaceVariant, StartEntry, StartEntryStatus};
use storage::repository::{RacesRepository, StartEntriesRepository};
use storage::Database;
use uuid::Uuid;

use crate::features;

fn race_at(start_time: &str) -> Race {
    Race {
        id: Uuid::new_v4(),
        raceclass: "G16".to_string(),
        order: 1,
        start_time: NaiveDateTime::parse_from_str(start_time, "%Y-%m-%d %H:%M:%S").unwrap(),
        max_no_of_contestants: 10,
        no_of_contestants: 2,
        event_id: "event-1".to_string(),
        raceplan_id: Uuid::new_v4(),
        start_entries: Vec::new(),
        results: Default::default(),
        variant: RaceVariant::IntervalStart,
    }
}

#[actix_web::test]
async fn ping_answers_ok() {
    let app = test::init_service(App::new().configure(features::health::configure)).await;

    let response = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
    assert!(response.status().is_success());
}

#[actix_web::test]
async fn listing_raceplans_starts_empty() {
    let db = web::Data::new(Database::new());
    let app = test::init_service(
        App::new()
            .app_data(db.clone())
            .configure(features::raceplans::routes::configure),
    )
    .await;

    let response =
        test::call_service(&app, test::TestRequest::get().uri("/raceplans").to_request()).await;
    assert!(response.status().is_success());
    let body: Vec<serde_json::Value> = test::read_body_json(response).await;
    assert!(body.is_empty());
}

#[actix_web::test]
async fn unknown_raceplan_is_404_with_detail() {
    let db = web::Data::new(Database::new());
    let app = test::init_service(
        App::new()
            .app_data(db.clone())
            .configure(features::raceplans::routes::configure),
    )
    .await;

    let uri = format!("/raceplans/{}", Uuid::new_v4());
    let response =
        test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert!(body["detail"].is_string());
}

#[actix_web::test]
async fn race_detail_carries_sorted_start_entries() {
    let db = web::Data::new(Database::new());
    let race = race_at("2023-08-17 09:00:00");
    RacesRepository::new(&db).create(race.clone()).await.unwrap();
    let se_repo = StartEntriesRepository::new(&db);
    for (bib, position) in [(12, 2), (11, 1)] {
        se_repo
            .create(StartEntry {
                id: Uuid::new_v4(),
                race_id: race.id,
                startlist_id: None,
                bib,
                name: format!("Runner {bib}"),
                club: "Kjelsås".to_string(),
                starting_position: position,
                scheduled_start_time: race.start_time,
                actual_start_time: None,
                status: StartEntryStatus::None,
                changelog: Vec::new(),
            })
            .await
            .unwrap();
    }

    let app = test::init_service(
        App::new()
            .app_data(db.clone())
            .configure(features::races::routes::configure),
    )
    .await;

    let uri = format!("/races/{}", race.id);
    let response =
        test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert!(response.status().is_success());
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["datatype"], "interval_start");
    assert_eq!(body["start_entries"][0]["bib"], 11);
    assert_eq!(body["start_entries"][1]["bib"], 12);

    // The scoped start-entry listing answers on the nested path.
    let uri = format!("/races/{}/start-entries", race.id);
    let response =
        test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert!(response.status().is_success());
    let body: Vec<serde_json::Value> = test::read_body_json(response).await;
    assert_eq!(body.len(), 2);
}
