// src/bin/auto_settlement.rs
//
// Job de baixa automática de parcelas. Execute diariamente via cron:
//
//     0 6 * * *  auto-settlement
//
// Varre as parcelas pendentes com baixa automática ligada e vencimento
// até hoje, liquidando cada uma na própria data de vencimento.

use chrono::Local;
use sqlx::sqlite::SqlitePoolOptions;
use std::{env, time::Duration};

use placar_fluxo_backend::db::InstallmentRepository;
use placar_fluxo_backend::services::InstallmentService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();
    dotenvy::dotenv().ok();

    tracing::info!("Iniciando processo de baixa automática...");

    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://placar_fluxo.db?mode=rwc".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&db_pool).await?;

    let service = InstallmentService::new(InstallmentRepository::new(db_pool.clone()));

    let today = Local::now().date_naive();
    let summary = service.run_auto_settlement_sweep(today).await?;

    tracing::info!(
        processed = summary.processed,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Processo de baixa automática finalizado"
    );

    db_pool.close().await;
    Ok(())
}
