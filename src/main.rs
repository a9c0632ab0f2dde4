use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use taskgate::auth::{AuthMiddleware, Authenticator, Registrar, TokenCodec};
use taskgate::config::Config;
use taskgate::routes;
use taskgate::store::postgres::{PgCredentialStore, PgTaskStore};
use taskgate::store::{CredentialStore, TaskStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let credential_store: Arc<dyn CredentialStore> =
        Arc::new(PgCredentialStore::new(pool.clone()));
    let task_store: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));
    let codec = TokenCodec::new(config.jwt_secret.clone(), config.jwt_expiration_secs);

    let authenticator = web::Data::new(Authenticator::new(
        Arc::clone(&credential_store),
        codec.clone(),
    ));
    let registrar = web::Data::new(Registrar::new(Arc::clone(&credential_store)));
    let task_store_data: web::Data<dyn TaskStore> = web::Data::from(task_store);

    log::info!("Starting TaskGate server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(authenticator.clone())
            .app_data(registrar.clone())
            .app_data(task_store_data.clone())
            .wrap(AuthMiddleware::new(
                codec.clone(),
                Arc::clone(&credential_store),
            ))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .configure(routes::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
