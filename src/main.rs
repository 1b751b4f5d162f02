use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mieldb::config::{CliArgs, Config};
use mieldb::services::TransactionService;
use mieldb::session::{DatabaseState, ModePreference, SessionManager};
use mieldb::sqlite_storage::SqliteConfig;
use mieldb::ProviderFactory;

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!(error = %e, "failed to create data directory");
            std::process::exit(1);
        }
    }

    let factory = Arc::new(ProviderFactory::new(SqliteConfig::at(&db_path)));
    let preference = match &config.database.preference_file {
        Some(path) => ModePreference::at(path),
        None => ModePreference::default_location(),
    };
    let manager = SessionManager::new(factory.clone(), preference);

    let demo = manager.resolve_mode(cli.demo_override());
    tracing::info!(demo, db = %db_path.display(), "starting Miel data layer");

    match manager.apply_mode(demo).await {
        DatabaseState::Ready => {}
        DatabaseState::Error(msg) => {
            tracing::error!(%msg, "database initialization failed");
            std::process::exit(1);
        }
        DatabaseState::Initializing => unreachable!("apply_mode always settles"),
    }

    match factory.get(None).await {
        Ok(provider) => {
            let transactions = TransactionService::new(&provider);
            match transactions.transaction_summary(None, None).await {
                Ok(summary) => tracing::info!(
                    income = %summary.total_income,
                    expense = %summary.total_expense,
                    balance = %summary.balance,
                    count = summary.transaction_count,
                    "transaction summary"
                ),
                Err(e) => tracing::error!(error = %e, "failed to read transaction summary"),
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to resolve provider"),
    }

    if let Err(e) = factory.close().await {
        tracing::error!(error = %e, "failed to close backend");
    }
}
