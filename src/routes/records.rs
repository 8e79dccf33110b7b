use std::str::FromStr;

use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{EntityKind, RecordId};
use crate::dto::records::{DialogPageData, ManageQuery, SubmitResult};
use crate::forms::submission::{DialogSubmission, DialogTarget};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::records::{
    delete_record as delete_record_service, load_management_page, manage_url, open_dialog,
    submit_dialog,
};
use crate::services::{PageSettings, ServiceError};
use crate::table::AssignKind;

const MSG_UNAUTHORIZED: &str = "Bạn không có quyền truy cập trang này.";
const MSG_NOT_FOUND: &str = "Không tìm thấy bản ghi.";

fn parse_kind(slug: &str) -> Option<EntityKind> {
    EntityKind::from_str(slug).ok()
}

fn render_dialog(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    home_url: &str,
    page: &DialogPageData,
) -> HttpResponse {
    let mut context = base_context(flash_messages, user, page.slug, home_url);
    context.insert("page", page);
    render_template(tera, "manage/dialog.html", &context)
}

/// Response for a dialog that could not be opened.
fn dialog_error(kind: EntityKind, err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error(MSG_UNAUTHORIZED).send();
            redirect("/na")
        }
        ServiceError::NotFound => {
            FlashMessage::error(MSG_NOT_FOUND).send();
            redirect(&manage_url(kind))
        }
        err => {
            log::error!("Failed to open {kind} dialog: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/manage/{kind}")]
pub async fn manage_records(
    kind: web::Path<String>,
    query: web::Query<ManageQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(kind) = parse_kind(&kind) else {
        return HttpResponse::NotFound().finish();
    };
    let settings = PageSettings::from_config(&server_config);

    match load_management_page(repo.get_ref(), &user, kind, query.into_inner(), &settings) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                kind.slug(),
                &server_config.auth_service_url,
            );
            context.insert("page", &data);
            render_template(&tera, "manage/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(MSG_UNAUTHORIZED).send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list {kind}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/manage/{kind}/new")]
pub async fn new_record(
    kind: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(kind) = parse_kind(&kind) else {
        return HttpResponse::NotFound().finish();
    };
    let settings = PageSettings::from_config(&server_config);

    match open_dialog(repo.get_ref(), &user, kind, DialogTarget::Create, &settings) {
        Ok(page) => render_dialog(
            &tera,
            &flash_messages,
            &user,
            &server_config.auth_service_url,
            &page,
        ),
        Err(err) => dialog_error(kind, err),
    }
}

#[get("/manage/{kind}/{id}/edit")]
pub async fn edit_record(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    let (Some(kind), Ok(id)) = (parse_kind(&kind), RecordId::new(id)) else {
        return HttpResponse::NotFound().finish();
    };
    let settings = PageSettings::from_config(&server_config);

    match open_dialog(repo.get_ref(), &user, kind, DialogTarget::Edit(id), &settings) {
        Ok(page) => render_dialog(
            &tera,
            &flash_messages,
            &user,
            &server_config.auth_service_url,
            &page,
        ),
        Err(err) => dialog_error(kind, err),
    }
}

#[get("/manage/{kind}/{id}/assign/{action}")]
pub async fn assign_record(
    path: web::Path<(String, i32, String)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (kind, id, action) = path.into_inner();
    let (Some(kind), Ok(id), Some(action)) = (
        parse_kind(&kind),
        RecordId::new(id),
        AssignKind::from_slug(&action),
    ) else {
        return HttpResponse::NotFound().finish();
    };
    let settings = PageSettings::from_config(&server_config);
    let target = DialogTarget::Assign(id, action);

    match open_dialog(repo.get_ref(), &user, kind, target, &settings) {
        Ok(page) => render_dialog(
            &tera,
            &flash_messages,
            &user,
            &server_config.auth_service_url,
            &page,
        ),
        Err(err) => dialog_error(kind, err),
    }
}

#[post("/manage/{kind}/save")]
pub async fn save_record(
    kind: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    body: String,
) -> impl Responder {
    let Some(kind) = parse_kind(&kind) else {
        return HttpResponse::NotFound().finish();
    };
    let submission = match DialogSubmission::parse(&body) {
        Ok(submission) => submission,
        Err(err) => {
            log::warn!("Rejected {kind} submission: {err}");
            FlashMessage::error("Dữ liệu gửi lên không hợp lệ.").send();
            return redirect(&manage_url(kind));
        }
    };
    let settings = PageSettings::from_config(&server_config);

    match submit_dialog(repo.get_ref(), &user, kind, submission, &settings) {
        Ok(SubmitResult::Saved(message)) => {
            FlashMessage::success(message).send();
            redirect(&manage_url(kind))
        }
        Ok(SubmitResult::Rejected(page)) => render_dialog(
            &tera,
            &flash_messages,
            &user,
            &server_config.auth_service_url,
            &page,
        ),
        Err(err) => dialog_error(kind, err),
    }
}

#[post("/manage/{kind}/{id}/delete")]
pub async fn delete_record(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    let Some(kind) = parse_kind(&kind) else {
        return HttpResponse::NotFound().finish();
    };

    match delete_record_service(repo.get_ref(), &user, kind, id) {
        Ok(()) => {
            FlashMessage::success("Đã xóa bản ghi.").send();
            redirect(&manage_url(kind))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(MSG_UNAUTHORIZED).send();
            redirect("/na")
        }
        Err(ServiceError::NotFound | ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(MSG_NOT_FOUND).send();
            redirect(&manage_url(kind))
        }
        Err(err) => {
            log::error!("Failed to delete {kind} #{id}: {err}");
            FlashMessage::error("Không thể xóa bản ghi.").send();
            redirect(&manage_url(kind))
        }
    }
}
