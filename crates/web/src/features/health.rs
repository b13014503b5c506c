use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ping", web::get().to(ping))
        .route("/ready", web::get().to(ready));
}

#[utoipa::path(get, path = "/ping", responses((status = 200, description = "Pong")))]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[utoipa::path(get, path = "/ready", responses((status = 200, description = "Ready")))]
pub async fn ready() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
