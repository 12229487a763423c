// src/config.rs

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::{env, time::Duration};

use crate::{
    db::{InstallmentRepository, OrderRepository, SellerRepository},
    services::{InstallmentService, OrderService},
};

// O estado compartilhado que será acessível em toda a aplicação.
// Substitui o handle global de banco: montado uma vez no startup e
// clonado para cada handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub order_service: OrderService,
    pub installment_service: InstallmentService,
    pub order_repo: OrderRepository,
    pub seller_repo: SellerRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // Ex.: sqlite://db/placar_fluxo.db?mode=rwc
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://placar_fluxo.db?mode=rwc".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let order_repo = OrderRepository::new(db_pool.clone());
        let installment_repo = InstallmentRepository::new(db_pool.clone());
        let seller_repo = SellerRepository::new(db_pool.clone());

        let order_service = OrderService::new(order_repo.clone(), installment_repo.clone());
        let installment_service = InstallmentService::new(installment_repo);

        Ok(Self {
            db_pool,
            order_service,
            installment_service,
            order_repo,
            seller_repo,
        })
    }
}
