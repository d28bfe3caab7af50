use dotenvy::dotenv;
use procurement_desk::{
    config::{database, reference, storage},
    core::{reference::seed_reference_data, status::seed_statuses},
    errors::Result,
};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const REFERENCE_CONFIG_PATH: &str = "config.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Attachments live on local disk; this also creates the default data directory
    let attachment_root = storage::get_attachment_root();
    tokio::fs::create_dir_all(&attachment_root).await?;
    info!("Attachments stored under {}", attachment_root.display());

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the status catalog
    seed_statuses(&db)
        .await
        .inspect(|()| info!("Status catalog seeded."))
        .inspect_err(|e| error!("Failed to seed statuses: {}", e))?;

    // 6. Seed lookup tables from config.toml when present
    if Path::new(REFERENCE_CONFIG_PATH).exists() {
        let config = reference::load_default_config()?;
        let summary = seed_reference_data(&db, &config)
            .await
            .inspect_err(|e| error!("Failed to seed reference data: {}", e))?;
        info!(?summary, "Reference data seeded.");
    } else {
        warn!("{} not found; skipping reference data seeding.", REFERENCE_CONFIG_PATH);
    }

    info!("Procurement desk initialized.");
    Ok(())
}
