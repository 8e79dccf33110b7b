//! Declarative list/detail rendering for an after-school administration
//! front-end: descriptor-driven forms, tables and CRUD dialogs, plus the
//! Actix-web application serving them.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod descriptors;
#[cfg(feature = "data")]
pub mod dialog;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "data")]
pub mod entities;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "data")]
pub mod table;

#[cfg(feature = "server")]
pub use server::run;

#[cfg(feature = "server")]
mod server {
    use actix_cors::Cors;
    use actix_files::Files;
    use actix_identity::IdentityMiddleware;
    use actix_session::{SessionMiddleware, storage::CookieSessionStore};
    use actix_web::cookie::Key;
    use actix_web::{App, HttpServer, middleware, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
    use tera::Tera;

    use crate::db::establish_connection_pool;
    use crate::middleware::redirect_unauthorized;
    use crate::models::config::ServerConfig;
    use crate::repository::DieselRepository;
    use crate::routes::main::{logout, not_assigned, show_index};
    use crate::routes::records::{
        assign_record, delete_record, edit_record, manage_records, new_record, save_record,
    };

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        // Establish Diesel connection pool for the SQLite database.
        let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
            std::io::Error::other(format!("Failed to establish database connection: {e}"))
        })?;

        let repo = DieselRepository::new(pool);

        // Keys and stores for identity, sessions, and flash messages.
        let secret_key = Key::from(server_config.secret.as_bytes());

        let message_store = CookieMessageStore::builder(secret_key.clone()).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        let tera = Tera::new(&server_config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let bind_address = (server_config.address.clone(), server_config.port);
        log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(message_framework.clone())
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                        .cookie_secure(false) // set to true in prod
                        .cookie_domain(Some(format!(".{}", server_config.domain)))
                        .build(),
                )
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .service(Files::new("/assets", "./assets"))
                .service(
                    web::scope("")
                        .wrap(redirect_unauthorized())
                        .service(show_index)
                        .service(not_assigned)
                        .service(manage_records)
                        .service(new_record)
                        .service(edit_record)
                        .service(assign_record)
                        .service(save_record)
                        .service(delete_record)
                        .service(logout),
                )
                .app_data(web::Data::new(tera.clone()))
                .app_data(web::Data::new(repo.clone()))
                .app_data(web::Data::new(server_config.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
