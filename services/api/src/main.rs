use sea_orm::Database;
use tracing::info;

use eventhub_api::config::ApiConfig;
use eventhub_api::infra::mail::HttpMailer;
use eventhub_api::router::build_router;
use eventhub_api::scheduler::run_reminder_loop;
use eventhub_api::state::AppState;

#[tokio::main]
async fn main() {
    eventhub_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = HttpMailer::new(&config.mail_api_base, &config.mail_api_key, &config.mail_sender)
        .expect("failed to build mail client");

    let state = AppState {
        db,
        mailer,
        jwt_secret: config.jwt_secret,
    };

    // Spawn daily reminder loop
    tokio::spawn(run_reminder_loop(state.clone()));

    // HTTP server
    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
