//! Redirects requests that failed authentication to the sign-in page.

use actix_web::body::EitherBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, web};

use crate::models::config::ServerConfig;

/// Sign-in location used when no [`ServerConfig`] is registered.
pub const DEFAULT_SIGNIN_URL: &str = "/auth/signin";

/// Turns every `401 Unauthorized` into a `303` to the sign-in service.
pub fn redirect_unauthorized<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::UNAUTHORIZED, to_signin)
}

fn to_signin<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let location = res
        .request()
        .app_data::<web::Data<ServerConfig>>()
        .map(|config| config.auth_service_url.clone())
        .unwrap_or_else(|| DEFAULT_SIGNIN_URL.to_string());

    let (req, _) = res.into_parts();
    let response = HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish();
    let res: ServiceResponse<EitherBody<B>> =
        ServiceResponse::new(req, response).map_into_right_body();

    Ok(ErrorHandlerResponse::Response(res))
}
