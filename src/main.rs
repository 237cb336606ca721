use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, instrument};
use users_api::application::service::UserService;
use users_api::data::postgres::{PgUserRepository, init_pool};
use users_api::infrastructure::logging::init_logging;
use users_api::presentation::handlers::{
    AppState, create_user, delete_user, health_check, list_users, update_user,
};
use users_api::presentation::middleware::RequestTrace;

#[tokio::main]
#[instrument]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();
    info!("Logging initialized");

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    info!("Connecting to postgres");
    let pool = init_pool(&database_url).await?;
    info!("Connection pool ready");

    let repository = PgUserRepository::new(pool);
    let service = UserService::new(Arc::new(repository));
    let state = web::Data::new(AppState { service });
    info!("Application state initialized");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(RequestTrace)
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/users")
                    .route("", web::get().to(list_users::<PgUserRepository>))
                    .route("/", web::get().to(list_users::<PgUserRepository>))
                    .route("/push", web::post().to(create_user::<PgUserRepository>))
                    .route("/update", web::post().to(update_user::<PgUserRepository>))
                    .route("/delete", web::get().to(delete_user::<PgUserRepository>)),
            )
    });

    info!(address = %bind_addr, "Binding server to address");
    let server = server.bind(bind_addr.as_str())?;

    info!(
        address = %bind_addr,
        routes = %"GET /health, GET /users/, POST /users/push, POST /users/update, GET /users/delete",
        "Starting HTTP server"
    );
    server.run().await?;
    Ok(())
}
