use application_portal::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::auth::{require_admin, require_auth},
    routes, AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    app_state.user_service.seed_default_admin().await?;

    {
        let state = app_state.clone();
        tokio::spawn(async move {
            loop {
                match state.notification_service.run_once().await {
                    Ok(true) => {}
                    Ok(false) => {
                        tokio::time::sleep(Duration::from_millis(1000)).await;
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Notification worker error");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });
    }

    let public_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/login", post(routes::auth_routes::login))
        .route("/api/users", post(routes::user_routes::register))
        .route(
            "/api/password-reset/request",
            post(routes::password_reset_routes::request_reset),
        )
        .route(
            "/api/password-reset/confirm",
            post(routes::password_reset_routes::confirm_reset),
        )
        .route(
            "/api/announcements",
            get(routes::announcement_routes::list_announcements),
        )
        .route(
            "/api/announcements/:id",
            get(routes::announcement_routes::get_announcement),
        );

    let candidate_api = Router::new()
        .route(
            "/api/applications/with-documents",
            post(routes::application_routes::create_application),
        )
        .route(
            "/api/applications/me",
            get(routes::application_routes::list_my_applications),
        )
        .route(
            "/api/applications/:id",
            get(routes::application_routes::get_application)
                .put(routes::application_routes::update_application)
                .delete(routes::application_routes::cancel_application),
        )
        .route(
            "/api/applications/:id/documents/:document_id",
            delete(routes::application_routes::remove_document),
        )
        .route(
            "/api/applications/:id/complete",
            get(routes::application_routes::get_completeness),
        )
        .route("/api/users/me", get(routes::user_routes::me))
        .route(
            "/api/users/me/notifications",
            get(routes::user_routes::my_notifications),
        )
        .layer(axum::middleware::from_fn(require_auth));

    let admin_api = Router::new()
        .route(
            "/api/applications/:id/status",
            patch(routes::application_routes::update_status),
        )
        .route(
            "/api/applications/:id/history",
            get(routes::application_routes::get_history),
        )
        .route(
            "/api/announcements",
            post(routes::announcement_routes::create_announcement),
        )
        .route(
            "/api/announcements/:id",
            put(routes::announcement_routes::update_announcement)
                .delete(routes::announcement_routes::delete_announcement),
        )
        .route(
            "/api/announcements/:id/publish",
            post(routes::announcement_routes::publish_announcement),
        )
        .route(
            "/api/announcements/:id/close",
            post(routes::announcement_routes::close_announcement),
        )
        .route(
            "/api/announcements/:id/applications",
            get(routes::application_routes::list_by_announcement),
        )
        .route(
            "/api/academic-years",
            get(routes::academic_year_routes::list_academic_years)
                .post(routes::academic_year_routes::create_academic_year),
        )
        .route(
            "/api/academic-years/:id",
            get(routes::academic_year_routes::get_academic_year),
        )
        .layer(axum::middleware::from_fn(require_admin));

    info!("Serving documents from: {}", config.uploads_dir);

    let app = public_api
        .merge(candidate_api)
        .merge(admin_api)
        .nest_service(
            "/api/documents",
            tower_http::services::ServeDir::new(&config.uploads_dir),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
