// src/db/seller_repo.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::seller::{Seller, SellerCategory},
};

// O repositório de vendedores, responsável por todas as interações com a
// tabela 'sellers'. CRUD simples, sem transações multi-comando.
#[derive(Clone)]
pub struct SellerRepository {
    pool: SqlitePool,
}

impl SellerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Busca apenas vendedores ativos (listagem padrão do painel)
    pub async fn find_active(&self) -> Result<Vec<Seller>, AppError> {
        let sellers = sqlx::query_as::<_, Seller>(
            "SELECT id, name, category, individual_target, is_active
             FROM sellers WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sellers)
    }

    // Busca todos, inclusive inativos (tela de gerenciamento)
    pub async fn find_all(&self) -> Result<Vec<Seller>, AppError> {
        let sellers = sqlx::query_as::<_, Seller>(
            "SELECT id, name, category, individual_target, is_active
             FROM sellers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sellers)
    }

    pub async fn find_categories(&self) -> Result<Vec<SellerCategory>, AppError> {
        let categories = sqlx::query_scalar::<_, SellerCategory>(
            "SELECT DISTINCT category FROM sellers WHERE is_active = 1 ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn create(
        &self,
        name: &str,
        category: SellerCategory,
        individual_target: f64,
    ) -> Result<Seller, AppError> {
        let seller = sqlx::query_as::<_, Seller>(
            "INSERT INTO sellers (name, category, individual_target, is_active)
             VALUES (?, ?, ?, 1)
             RETURNING id, name, category, individual_target, is_active",
        )
        .bind(name)
        .bind(category)
        .bind(individual_target)
        .fetch_one(&self.pool)
        .await?;

        Ok(seller)
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        category: SellerCategory,
        individual_target: f64,
        is_active: bool,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE sellers SET name = ?, category = ?, individual_target = ?, is_active = ?
             WHERE id = ?",
        )
        .bind(name)
        .bind(category)
        .bind(individual_target)
        .bind(is_active)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // Soft delete: o vendedor continua referenciado por ordens antigas
    pub async fn deactivate(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE sellers SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
