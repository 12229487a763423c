// src/db/order_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{common::error::AppError, models::order::PendingOrder};

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ESCRITAS (sempre dentro da transação do OrderService)
    // =========================================================================

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        seller_id: i64,
        client_name: &str,
        final_client_name: Option<&str>,
        order_number: &str,
        order_date: NaiveDate,
        total_amount: f64,
        freight_amount: f64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO orders
            (seller_id, client_name, final_client_name, order_number, order_date, total_amount, freight_amount)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(seller_id)
        .bind(client_name)
        .bind(final_client_name)
        .bind(order_number)
        .bind(order_date)
        .bind(total_amount)
        .bind(freight_amount)
        .fetch_one(executor)
        .await
        // Violação do UNIQUE de order_number vira 409
        .map_err(AppError::from_order_insert)?;

        Ok(id)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        product_name: &str,
        amount: f64,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT INTO order_items (order_id, product_name, amount) VALUES (?, ?, ?)")
            .bind(order_id)
            .bind(product_name)
            .bind(amount)
            .execute(executor)
            .await?;

        Ok(())
    }

    // Exclui a ordem em si; os itens caem pelo ON DELETE CASCADE.
    // As parcelas são excluídas explicitamente antes (ver OrderService).
    pub async fn delete_order<'e, E>(&self, executor: E, order_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  LEITURAS / ATUALIZAÇÃO DE STATUS
    // =========================================================================

    // Ordens "pendentes": nenhuma parcela paga ainda. Assim que a primeira
    // parcela é baixada, a ordem sai desta lista.
    pub async fn find_pending(&self) -> Result<Vec<PendingOrder>, AppError> {
        let orders = sqlx::query_as::<_, PendingOrder>(
            r#"
            SELECT
                oc.id,
                oc.order_number,
                oc.client_name,
                oc.total_amount,
                oc.pending_reason,
                oc.status_color,
                v.name AS seller_name
            FROM orders oc
            LEFT JOIN sellers v ON oc.seller_id = v.id
            WHERE oc.id NOT IN (
                SELECT DISTINCT order_id FROM installments
                WHERE status = 'Paid' AND order_id IS NOT NULL
            )
            ORDER BY oc.order_number ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn update_status(
        &self,
        order_id: i64,
        pending_reason: &str,
        status_color: &str,
    ) -> Result<u64, AppError> {
        let result =
            sqlx::query("UPDATE orders SET pending_reason = ?, status_color = ? WHERE id = ?")
                .bind(pending_reason)
                .bind(status_color)
                .bind(order_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
