//! # Quill Web Server
//!
//! The Actix-web HTTP server rendering the blog.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;
mod urls;
mod views;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[cfg(feature = "rate-limit")]
use {
    middleware::rate_limit::RateLimitMiddleware, quill_core::ports::RateLimiter,
    quill_infra::InMemoryRateLimiter, std::sync::Arc,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!("Starting Quill on {}:{}", config.host, config.port);

    let state = web::Data::new(AppState::new(&config).await);

    #[cfg(feature = "rate-limit")]
    let auth_limiter: Arc<dyn RateLimiter> =
        Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));

    HttpServer::new(move || {
        let auth = handlers::auth_scope();
        #[cfg(feature = "rate-limit")]
        let auth = auth.wrap(RateLimitMiddleware::new(auth_limiter.clone()));

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .service(auth)
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
