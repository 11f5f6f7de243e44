use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use motor_tracker::config::{database::DatabaseConfig, environment::EnvironmentConfig};
use motor_tracker::controllers::auth_controller::ensure_bootstrap_admin;
use motor_tracker::database;
use motor_tracker::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("⚙️  Motor Maintenance Tracker API");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    info!("🔧 Environment: {}", config.environment);

    let state = match DatabaseConfig::from_environment(&config) {
        Some(db_config) => {
            let pool = database::connect(&db_config).await.map_err(|e| {
                error!("❌ Error connecting to the database: {}", e);
                e
            })?;
            info!("✅ PostgreSQL connected");
            AppState::new(pool, config.clone())
        }
        None => {
            warn!("⚠️  DATABASE_URL not set, using the in-memory store; data is lost on restart");
            AppState::in_memory(config.clone())
        }
    };

    ensure_bootstrap_admin(&state).await?;

    let app = motor_tracker::create_router(state);
    let addr = config.server_url();

    info!("🌐 Server starting on http://{}", addr);
    info!("🔍 Available endpoints:");
    info!("   GET  / - Banner");
    info!("   GET  /health - Health check");
    info!("🔐 Auth:");
    info!("   POST /api/auth/login - Log in");
    info!("⚙️  Motors:");
    info!("   GET  /api/motors - List motors (?status=)");
    info!("   POST /api/motors - Register motor");
    info!("   GET  /api/motors/:id - Get motor");
    info!("   PUT  /api/motors/:id - Update motor");
    info!("   DELETE /api/motors/:id - Delete motor");
    info!("   GET  /api/motors/:id/maintenance - Maintenance log");
    info!("   POST /api/motors/:id/maintenance - Add maintenance event");
    info!("   PUT  /api/motors/:id/maintenance/:event_id - Update maintenance event");
    info!("   DELETE /api/motors/:id/maintenance/:event_id - Delete maintenance event");
    info!("🏭 Equipment:");
    info!("   GET  /api/equipment - List equipment");
    info!("   POST /api/equipment - Register equipment");
    info!("   GET  /api/equipment/:id - Get equipment");
    info!("   PUT  /api/equipment/:id - Update equipment");
    info!("   DELETE /api/equipment/:id - Delete equipment");
    info!("   POST /api/equipment/:id/assign-motor - Install a spare motor");
    info!("   POST /api/equipment/:id/remove-motor - Uninstall the current motor");
    info!("   GET  /api/equipment/by-motor/:motor_id - Equipment for a motor");
    info!("📊 Reports:");
    info!("   GET  /api/reports - Available reports");
    info!("   GET  /api/reports/active-motors - Active motor report");
    info!("   GET  /api/reports/active-motors/export-excel - Excel export");
    info!("   GET  /api/reports/active-motors/export-pdf - PDF export");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Server error: {}", e);
            e
        })?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 Termination signal received, shutting down...");
        },
    }
}
