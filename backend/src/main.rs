use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;

use site_backend::{
    build_router,
    config::Config,
    db,
    repositories::contact_repository::{ContactStore, DieselContactStore, SkippedContactStore},
    utils::email_utils::{LogMailer, Mailer, SmtpMailer},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,site_backend=debug"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Config::from_env()?;

    let _guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((dsn, sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        }))
    });

    let contact_store: Arc<dyn ContactStore> = match &config.database_url {
        Some(database_url) => {
            let pool = db::build_pool(database_url)?;
            db::run_migrations(&pool)?;
            Arc::new(DieselContactStore::new(pool))
        }
        None => Arc::new(SkippedContactStore),
    };
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => Arc::new(LogMailer),
    };

    let state = Arc::new(AppState {
        contact_store,
        mailer,
        contact_recipient: config.contact_recipient.clone(),
    });
    let app = build_router(state, config.allowed_origins.clone());

    tracing::info!("Starting server on port {}", config.port);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
