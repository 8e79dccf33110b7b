//! Actix handlers and the helpers they share.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::EntityKind;
use crate::models::config::ServerConfig;
use crate::services::auth::{SessionProvider, current_user};
use crate::services::records::{management_roles, manage_url};

pub mod main;
pub mod records;

/// Entry of the navigation bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub slug: &'static str,
    pub title: &'static str,
    pub url: String,
}

/// Management pages `user` may open, in catalogue order.
pub fn navigation(user: &AuthenticatedUser) -> Vec<NavItem> {
    EntityKind::ALL
        .into_iter()
        .filter(|kind| {
            management_roles(*kind)
                .iter()
                .any(|role| user.has_role(*role))
        })
        .map(|kind| NavItem {
            slug: kind.slug(),
            title: kind.title(),
            url: manage_url(kind),
        })
        .collect()
}

/// Bootstrap alert class of a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// `303 See Other` pointing at `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Renders `template`, answering 500 when tera fails.
pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Context every page starts from: alerts, the user, navigation.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context.insert("navigation", &navigation(user));
    context
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorInternalServerError("server configuration is not registered"))?;
    let token = req
        .get_identity()
        .ok()
        .and_then(|identity| identity.session_token());

    current_user(&token, &config.secret).map_err(|_| ErrorUnauthorized("sign in required"))
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
