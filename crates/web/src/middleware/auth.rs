use actix_web::{dev::ServiceRequest, web, Error};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use adapters::{AdapterError, UsersClient};

use crate::error::WebError;

/// Validate the bearer token against the users service. Every mutating
/// route is wrapped with this; token verification itself is delegated.
pub async fn bearer_token_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let users = req
        .app_data::<web::Data<UsersClient>>()
        .expect("UsersClient not configured");

    match users.authorize(credentials.token()).await {
        Ok(()) => Ok(req),
        Err(AdapterError::Unauthorized | AdapterError::Forbidden) => {
            tracing::warn!("rejected bearer token");
            Err((WebError::Unauthorized.into(), req))
        }
        Err(err) => Err((WebError::Adapter(err).into(), req)),
    }
}
