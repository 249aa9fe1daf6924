use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use eventlink::config::AppConfig;
use eventlink::db;
use eventlink::handlers;
use eventlink::services::notifications::email::MailRelaySink;
use eventlink::services::notifications::{LogSink, NotificationSink};
use eventlink::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let notifications: Box<dyn NotificationSink> = if config.mail_api_url.is_empty() {
        tracing::info!("MAIL_API_URL not set, logging notifications instead of sending");
        Box::new(LogSink)
    } else {
        tracing::info!("sending notifications through mail relay at {}", config.mail_api_url);
        Box::new(MailRelaySink::new(
            config.mail_api_url.clone(),
            config.mail_api_token.clone(),
            config.mail_from.clone(),
        ))
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifications,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/change-role", post(handlers::auth::change_role))
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route("/api/users", get(handlers::users::get_users))
        .route("/api/users/:id", put(handlers::users::update_user))
        .route("/api/users/:id", delete(handlers::users::delete_user))
        .route(
            "/api/organizations",
            get(handlers::organizations::get_organizations)
                .post(handlers::organizations::create_organization),
        )
        .route(
            "/api/organizations/:id",
            get(handlers::organizations::get_organization)
                .put(handlers::organizations::update_organization)
                .delete(handlers::organizations::delete_organization),
        )
        .route(
            "/api/events",
            get(handlers::events::get_events).post(handlers::events::create_event),
        )
        .route(
            "/api/events/:id",
            get(handlers::events::get_event)
                .put(handlers::events::update_event)
                .delete(handlers::events::delete_event),
        )
        .route(
            "/api/events/:id/status",
            put(handlers::events::update_event_status),
        )
        .route(
            "/api/events/organization/:id",
            get(handlers::events::get_events_for_organization),
        )
        .route(
            "/api/crews",
            get(handlers::crews::get_crews).post(handlers::crews::create_crew),
        )
        .route(
            "/api/crews/:id",
            get(handlers::crews::get_crew)
                .put(handlers::crews::update_crew)
                .delete(handlers::crews::delete_crew),
        )
        .route(
            "/api/crews/:id/status",
            put(handlers::crews::update_crew_status),
        )
        .route(
            "/api/crews/:id/members",
            post(handlers::crews::add_crew_member),
        )
        .route(
            "/api/crews/:id/members/:member_id",
            put(handlers::crews::update_crew_member).delete(handlers::crews::remove_crew_member),
        )
        .route(
            "/api/calendar/bookings",
            get(handlers::calendar::get_bookings).post(handlers::calendar::create_booking),
        )
        .route(
            "/api/calendar/check-availability",
            get(handlers::calendar::check_availability),
        )
        .route(
            "/api/calendar/block-dates",
            post(handlers::calendar::block_dates),
        )
        .route(
            "/api/calendar/bookings/:id/status",
            put(handlers::calendar::update_booking_status),
        )
        .route(
            "/api/calendar/bookings/:id",
            delete(handlers::calendar::delete_booking),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
