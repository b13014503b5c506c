use actix_web::{web, Scope};
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::middleware::auth::bearer_token_validator;

use super::handlers;

/// Start-entries are a race-scoped resource; mounted inside the `/races`
/// scope.
pub fn scoped() -> Scope {
    let auth = HttpAuthentication::bearer(bearer_token_validator);

    web::scope("/{raceId}/start-entries")
        .route("", web::get().to(handlers::list_start_entries))
        .route(
            "",
            web::post().to(handlers::create_start_entry).wrap(auth.clone()),
        )
        .route("/{id}", web::get().to(handlers::get_start_entry))
        .route(
            "/{id}",
            web::put().to(handlers::update_start_entry).wrap(auth.clone()),
        )
        .route(
            "/{id}",
            web::delete().to(handlers::delete_start_entry).wrap(auth),
        )
}
