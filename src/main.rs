use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod i18n;
mod model;
mod models;
mod routes;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::routes::RateLimiters;
use crate::utils::{emp_no_filter, employee_cache};
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Security Attendance API"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config).await?;
    let limiters = RateLimiters::from_config(&config)?;

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool.clone();
    let server_addr = config.server_addr.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = emp_no_filter::warmup_emp_no_filter(&pool_for_filter_warmup, 100).await {
            warn!(error = %e, "Failed to warm up emp_no filter");
        }
    });

    actix_web::rt::spawn(async move {
        // Employees seen in the last 30 days, 250 per batch
        if let Err(e) =
            employee_cache::warmup_employee_cache(&pool_for_cache_warmup, 30, 250).await
        {
            warn!(error = %e, "Failed to warm up employee cache");
        }
    });

    HttpServer::new(move || {
        let routes_config = config.clone();
        let limiters = limiters.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard so the UI's JS/CSS assets resolve
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(move |cfg| routes::configure(cfg, &routes_config, &limiters))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
