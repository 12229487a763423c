// src/db/installment_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::installment::{
        InstallmentFilter, InstallmentRow, InstallmentStatus, PaymentMethod, StatusFilter,
    },
};

// Candidata da varredura de baixa automática
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SweepCandidate {
    pub id: i64,
    pub amount: f64,
    pub due_date: NaiveDate,
}

#[derive(Clone)]
pub struct InstallmentRepository {
    pool: SqlitePool,
}

impl InstallmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  INSERÇÕES
    // =========================================================================

    // Parcela de uma ordem de compra (dentro da transação do OrderService)
    pub async fn insert_for_order<'e, E>(
        &self,
        executor: E,
        order_id: i64,
        amount: f64,
        due_date: NaiveDate,
        payment_method: PaymentMethod,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO installments (order_id, amount, due_date, payment_method, status)
            VALUES (?, ?, ?, ?, 'Pending')
            RETURNING id
            "#,
        )
        .bind(order_id)
        .bind(amount)
        .bind(due_date)
        .bind(payment_method)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    // Conta extra: parcela avulsa, sem ordem de compra
    pub async fn insert_extra(
        &self,
        description: &str,
        amount: f64,
        due_date: NaiveDate,
        payment_method: PaymentMethod,
        seller_id: Option<i64>,
    ) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO installments (description, amount, due_date, payment_method, status, seller_id)
            VALUES (?, ?, ?, ?, 'Pending', ?)
            RETURNING id
            "#,
        )
        .bind(description)
        .bind(amount)
        .bind(due_date)
        .bind(payment_method)
        .bind(seller_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn delete_by_order<'e, E>(&self, executor: E, order_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM installments WHERE order_id = ?")
            .bind(order_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  TRANSIÇÕES DE ESTADO (atualizações de linha única)
    // =========================================================================

    pub async fn settle(&self, id: i64, settlement_date: NaiveDate) -> Result<u64, AppError> {
        let result =
            sqlx::query("UPDATE installments SET status = 'Paid', settlement_date = ? WHERE id = ?")
                .bind(settlement_date)
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    // Estorno: volta para Pendente e limpa a data de pagamento,
    // incondicionalmente (idempotente).
    pub async fn reverse(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE installments SET status = 'Pending', settlement_date = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_due_date(&self, id: i64, new_date: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE installments SET due_date = ? WHERE id = ?")
            .bind(new_date)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_settlement_date(
        &self,
        id: i64,
        new_date: NaiveDate,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE installments SET settlement_date = ? WHERE id = ?")
            .bind(new_date)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_amount(&self, id: i64, new_amount: f64) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE installments SET amount = ? WHERE id = ?")
            .bind(new_amount)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_payment_method(
        &self,
        id: i64,
        new_method: PaymentMethod,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE installments SET payment_method = ? WHERE id = ?")
            .bind(new_method)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  BAIXA AUTOMÁTICA
    // =========================================================================

    // Vencimento da parcela, apenas se ainda estiver pendente.
    // Usado ao ativar a baixa automática.
    pub async fn find_pending_due_date(&self, id: i64) -> Result<Option<NaiveDate>, AppError> {
        let due_date = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT due_date FROM installments WHERE id = ? AND status = 'Pending'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(due_date)
    }

    // Ativar = marca a flag e liquida imediatamente na data de vencimento
    pub async fn enable_auto_settle(
        &self,
        id: i64,
        due_date: NaiveDate,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE installments
            SET auto_settle = 1, status = 'Paid', settlement_date = ?
            WHERE id = ?
            "#,
        )
        .bind(due_date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // Desativar = estorna e limpa a flag, qualquer que seja o estado atual
    pub async fn disable_auto_settle(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE installments
            SET auto_settle = 0, status = 'Pending', settlement_date = NULL
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // Parcelas elegíveis para a varredura: pendentes, com a flag ligada e
    // vencidas (ou vencendo hoje).
    pub async fn find_auto_settleable(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<SweepCandidate>, AppError> {
        let candidates = sqlx::query_as::<_, SweepCandidate>(
            r#"
            SELECT id, amount, due_date
            FROM installments
            WHERE status = 'Pending' AND auto_settle = 1 AND due_date <= ?
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    // Baixa de uma candidata: paga na própria data de vencimento e limpa a
    // flag, para não ser reprocessada pela próxima varredura.
    pub async fn auto_settle_one(&self, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE installments
            SET status = 'Paid', settlement_date = due_date, auto_settle = 0
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  LISTAGEM FILTRADA
    // =========================================================================

    // Monta o WHERE dinamicamente conforme os filtros do painel. O nome do
    // vendedor vem da ordem quando há vínculo, senão da própria parcela.
    pub async fn list(
        &self,
        filter: &InstallmentFilter,
        today: NaiveDate,
    ) -> Result<Vec<InstallmentRow>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT
                p.id, p.order_id, p.description, p.amount, p.due_date,
                p.status, p.settlement_date, p.payment_method, p.auto_settle,
                oc.order_number, oc.client_name, oc.order_date,
                COALESCE(v_oc.name, v_p.name) AS seller_name
            FROM installments p
            LEFT JOIN orders oc ON p.order_id = oc.id
            LEFT JOIN sellers v_oc ON oc.seller_id = v_oc.id
            LEFT JOIN sellers v_p ON p.seller_id = v_p.id
            WHERE 1=1
            "#,
        );

        match filter.status {
            Some(StatusFilter::Paid) => {
                qb.push(" AND p.status = ").push_bind(InstallmentStatus::Paid);
            }
            Some(StatusFilter::Pending) => {
                qb.push(" AND p.status = ")
                    .push_bind(InstallmentStatus::Pending)
                    .push(" AND p.due_date >= ")
                    .push_bind(today);
            }
            Some(StatusFilter::Overdue) => {
                qb.push(" AND p.status = ")
                    .push_bind(InstallmentStatus::Pending)
                    .push(" AND p.due_date < ")
                    .push_bind(today);
            }
            Some(StatusFilter::All) | None => {}
        }

        if let Some(seller_id) = filter.seller_id {
            qb.push(" AND (oc.seller_id = ")
                .push_bind(seller_id)
                .push(" OR p.seller_id = ")
                .push_bind(seller_id)
                .push(")");
        }

        if let Some(search) = filter.search.as_deref() {
            let term = format!("%{}%", search);
            qb.push(" AND (oc.client_name LIKE ")
                .push_bind(term.clone())
                .push(" OR p.description LIKE ")
                .push_bind(term.clone())
                .push(" OR oc.order_number LIKE ")
                .push_bind(term)
                .push(")");
        }

        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            qb.push(" AND p.due_date BETWEEN ")
                .push_bind(start)
                .push(" AND ")
                .push_bind(end);
        }

        qb.push(" ORDER BY p.due_date ASC");

        let rows = qb
            .build_query_as::<InstallmentRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
