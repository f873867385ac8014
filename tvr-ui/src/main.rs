//! tvr-ui - Traffic violation reporting web service

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tvr_common::config::{ensure_data_folder, resolve_data_folder};
use tvr_common::db::init::init_database;
use tvr_ui::mailer::{LogMailer, Mailer, SmtpMailer};
use tvr_ui::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "tvr-ui", about = "Traffic violation reporting web service")]
struct Args {
    /// Data folder holding the database (overrides TVR_DATA_FOLDER)
    #[arg(long)]
    data_folder: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 5180)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification IMMEDIATELY after tracing init
    info!(
        "Starting TVR web service (tvr-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), "TVR_DATA_FOLDER")?;
    let db_path = ensure_data_folder(&data_folder)?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    info!("✓ Database ready");

    // SMTP relay from the environment; log-only fallback for development
    let mailer: Arc<dyn Mailer> = match SmtpMailer::from_env()? {
        Some(mailer) => {
            info!("✓ SMTP relay configured");
            Arc::new(mailer)
        }
        None => {
            info!("No SMTP relay configured - verification codes will be logged");
            Arc::new(LogMailer)
        }
    };

    let state = AppState::new(pool, mailer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("tvr-ui listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
