use dotenvy::dotenv;
use school_desk::{
    config::{self, database, seed},
    core::Facade,
    errors::Result,
    render::TemplateStore,
    web::{self, AppState},
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Open the record store and create its tables
    let db = database::create_connection(&database::get_database_url())
        .await
        .inspect_err(|e| error!("Failed to open record store: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Record store initialized."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed fixtures into an empty store
    seed::seed_database(&db, &app_config.seed)
        .await
        .inspect(|seeded| info!(seeded, "Seed step finished."))
        .inspect_err(|e| error!("Failed to seed record store: {}", e))?;

    // 6. Serve the dashboard
    let facade = Facade::new(db, app_config.facade.latency());
    let templates = TemplateStore::new(app_config.templates.dir.clone());
    let listener = TcpListener::bind(app_config.server.bind.as_str())
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", app_config.server.bind, e))?;

    web::serve(listener, AppState::new(facade, templates)).await
}
