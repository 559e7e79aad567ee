//! Komuna server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use komuna_api::{ReportBroadcaster, middleware::AppState, not_found, router as api_router};
use komuna_common::{Config, LocalStorage, PrefsStore};
use komuna_core::{
    AdminService, EmailConfig, EmailProvider, EmailService, FeedbackService, PhotoService,
    ReportService, ResendConfig, SmtpConfig, StatsService,
};
use komuna_db::repositories::{AdminRepository, ReportRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Build the email configuration from settings, if any.
fn email_config(config: &Config) -> Option<EmailConfig> {
    let settings = config.email.as_ref()?;

    let provider = if let Some(api_key) = settings.resend_api_key.clone() {
        EmailProvider::Resend(ResendConfig { api_key })
    } else if let Some(smtp) = settings.smtp.clone() {
        EmailProvider::Smtp(SmtpConfig {
            host: smtp.host,
            port: smtp.port,
            username: smtp.username,
            password: smtp.password,
        })
    } else {
        tracing::warn!("Email settings present but no provider configured; notifications disabled");
        return None;
    };

    Some(EmailConfig {
        provider,
        from_address: settings.from_address.clone(),
        from_name: settings.from_name.clone(),
        instance_name: config.instance.name.clone(),
        instance_url: config.server.url.clone(),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "komuna=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting komuna server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = komuna_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    komuna_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let admin_repo = AdminRepository::new(Arc::clone(&db));

    // Load the preferences store
    let prefs = PrefsStore::load(config.prefs.path.clone()).await?;
    info!(path = %config.prefs.path.display(), "Preferences store loaded");

    // Initialize services
    let email_service = EmailService::new(email_config(&config));
    if email_service.is_enabled() {
        info!("Email notifications enabled");
    } else {
        info!("Email notifications disabled");
    }

    let storage = Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        format!(
            "{}{}",
            config.server.url.trim_end_matches('/'),
            config.storage.base_url
        ),
    ));

    let report_service = ReportService::new(
        report_repo.clone(),
        admin_repo.clone(),
        email_service,
    );
    let admin_service = AdminService::new(admin_repo);
    let stats_service = StatsService::new(report_service.clone(), prefs.clone());
    let photo_service = PhotoService::new(storage);
    let feedback_service = FeedbackService::new(report_repo, prefs.clone());

    // Seed the first superadmin when configured and the table is empty
    if let Some(bootstrap) = &config.bootstrap_admin {
        admin_service.ensure_bootstrap_admin(bootstrap).await?;
    }

    // Initialize the report change broadcaster
    let broadcaster = ReportBroadcaster::new();

    // Create app state
    let state = AppState {
        report_service,
        admin_service,
        stats_service,
        photo_service,
        feedback_service,
        prefs,
        instance: config.instance.clone(),
        broadcaster,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            komuna_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
