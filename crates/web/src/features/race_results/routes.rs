use actix_web::{web, Scope};
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::middleware::auth::bearer_token_validator;

use super::handlers;

/// Race-results are a race-scoped resource; mounted inside the `/races`
/// scope.
pub fn scoped() -> Scope {
    let auth = HttpAuthentication::bearer(bearer_token_validator);

    web::scope("/{raceId}/race-results")
        .route("", web::get().to(handlers::list_race_results))
        .route("/{id}", web::get().to(handlers::get_race_result))
        .route(
            "/{id}",
            web::put().to(handlers::update_race_result).wrap(auth.clone()),
        )
        .route(
            "/{id}",
            web::delete().to(handlers::delete_race_result).wrap(auth),
        )
}
