// src/services/order_service.rs

use chrono::NaiveDate;
use sqlx::Sqlite;

use crate::{
    common::error::AppError,
    db::{InstallmentRepository, OrderRepository},
    models::{installment::NewInstallment, order::NewOrderItem},
};

// O "compositor" de ordens: grava ordem + itens + parcelas como uma unidade.
#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    installment_repo: InstallmentRepository,
}

impl OrderService {
    pub fn new(order_repo: OrderRepository, installment_repo: InstallmentRepository) -> Self {
        Self {
            order_repo,
            installment_repo,
        }
    }

    /// Cria uma ordem de compra com seus itens e parcelas em uma única
    /// transação. O valor total é calculado aqui, a partir dos itens; o
    /// cliente nunca o informa. Qualquer falha desfaz tudo: nenhuma linha
    /// das três tabelas sobrevive a um erro.
    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        seller_id: i64,
        client_name: &str,
        final_client_name: Option<&str>,
        order_number: &str,
        order_date: NaiveDate,
        items: &[NewOrderItem],
        freight_amount: f64,
        installments: &[NewInstallment],
    ) -> Result<i64, AppError>
    where
        E: sqlx::Acquire<'e, Database = Sqlite>,
    {
        // Pré-condições verificadas antes de abrir a transação
        if items.is_empty() || installments.is_empty() {
            return Err(AppError::InvalidData(
                "A ordem precisa de ao menos um item e uma parcela.".into(),
            ));
        }
        for p in installments {
            if p.amount <= 0.0 {
                return Err(AppError::InvalidData(
                    "Toda parcela precisa de um valor maior que zero.".into(),
                ));
            }
        }

        let total_amount: f64 = items.iter().map(|item| item.amount).sum();

        let mut tx = executor.begin().await?;

        let order_id = self
            .order_repo
            .insert_order(
                &mut *tx,
                seller_id,
                client_name,
                final_client_name,
                order_number,
                order_date,
                total_amount,
                freight_amount,
            )
            .await?;

        for item in items {
            self.order_repo
                .insert_item(&mut *tx, order_id, &item.name, item.amount)
                .await?;
        }

        for parcela in installments {
            self.installment_repo
                .insert_for_order(
                    &mut *tx,
                    order_id,
                    parcela.amount,
                    parcela.due_date,
                    parcela.payment_method,
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id,
            order_number,
            total_amount,
            "Ordem de compra criada com {} item(ns) e {} parcela(s)",
            items.len(),
            installments.len()
        );

        Ok(order_id)
    }

    /// Exclui a ordem, suas parcelas e seus itens em uma transação.
    /// Exclusão parcial nunca é observável.
    pub async fn delete_order<'e, E>(&self, executor: E, order_id: i64) -> Result<(), AppError>
    where
        E: sqlx::Acquire<'e, Database = Sqlite>,
    {
        let mut tx = executor.begin().await?;

        // Primeiro as parcelas, depois a ordem (itens caem pelo CASCADE)
        self.installment_repo
            .delete_by_order(&mut *tx, order_id)
            .await?;

        let deleted = self.order_repo.delete_order(&mut *tx, order_id).await?;
        if deleted == 0 {
            // Transação é descartada sem commit: nada foi excluído
            return Err(AppError::OrderNotFound);
        }

        tx.commit().await?;

        tracing::info!(order_id, "Ordem de compra e parcelas associadas excluídas");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SellerRepository;
    use crate::models::installment::PaymentMethod;
    use crate::models::seller::SellerCategory;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn test_pool() -> SqlitePool {
        // Uma única conexão: em memória, cada conexão teria um banco próprio
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    fn service(pool: &SqlitePool) -> OrderService {
        OrderService::new(
            OrderRepository::new(pool.clone()),
            InstallmentRepository::new(pool.clone()),
        )
    }

    async fn seed_seller(pool: &SqlitePool) -> i64 {
        SellerRepository::new(pool.clone())
            .create("Maria Souza", SellerCategory::Commercial, 270000.0)
            .await
            .unwrap()
            .id
    }

    fn date(s: &str) -> chrono::NaiveDate {
        s.parse().unwrap()
    }

    fn items_widget() -> Vec<NewOrderItem> {
        vec![NewOrderItem {
            name: "Widget".into(),
            amount: 500.0,
        }]
    }

    fn installments_oc100() -> Vec<NewInstallment> {
        vec![
            NewInstallment {
                amount: 400.0,
                due_date: date("2024-01-10"),
                payment_method: PaymentMethod::Boleto,
            },
            NewInstallment {
                amount: 100.0,
                due_date: date("2024-01-20"),
                payment_method: PaymentMethod::Card,
            },
        ]
    }

    async fn row_counts(pool: &SqlitePool) -> (i64, i64, i64) {
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await
            .unwrap();
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(pool)
            .await
            .unwrap();
        let installments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM installments")
            .fetch_one(pool)
            .await
            .unwrap();
        (orders, items, installments)
    }

    #[tokio::test]
    async fn total_da_ordem_e_a_soma_dos_itens() {
        let pool = test_pool().await;
        let seller_id = seed_seller(&pool).await;
        let svc = service(&pool);

        let order_id = svc
            .create_order(
                &pool,
                seller_id,
                "Metalúrgica Aurora",
                None,
                "OC-100",
                date("2024-01-05"),
                &items_widget(),
                0.0,
                &installments_oc100(),
            )
            .await
            .unwrap();

        let total: f64 = sqlx::query_scalar("SELECT total_amount FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(total, 500.0);

        // Duas parcelas pendentes, sem data de pagamento
        let pendentes: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM installments
             WHERE order_id = ? AND status = 'Pending' AND settlement_date IS NULL",
        )
        .bind(order_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(pendentes, 2);

        // O método gravado é sempre o valor canônico
        let metodo: String = sqlx::query_scalar(
            "SELECT payment_method FROM installments WHERE order_id = ? AND amount = 100.0",
        )
        .bind(order_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(metodo, "Card");
    }

    #[tokio::test]
    async fn numero_de_oc_duplicado_nao_deixa_residuo() {
        let pool = test_pool().await;
        let seller_id = seed_seller(&pool).await;
        let svc = service(&pool);

        svc.create_order(
            &pool,
            seller_id,
            "Metalúrgica Aurora",
            None,
            "OC-100",
            date("2024-01-05"),
            &items_widget(),
            0.0,
            &installments_oc100(),
        )
        .await
        .unwrap();

        let before = row_counts(&pool).await;

        let err = svc
            .create_order(
                &pool,
                seller_id,
                "Outro Cliente",
                None,
                "OC-100",
                date("2024-01-06"),
                &items_widget(),
                0.0,
                &installments_oc100(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OrderNumberTaken));

        // Nenhuma linha nova em nenhuma das três tabelas
        assert_eq!(row_counts(&pool).await, before);
    }

    #[tokio::test]
    async fn ordem_sem_itens_ou_sem_parcelas_e_rejeitada() {
        let pool = test_pool().await;
        let seller_id = seed_seller(&pool).await;
        let svc = service(&pool);

        let err = svc
            .create_order(
                &pool,
                seller_id,
                "Cliente",
                None,
                "OC-200",
                date("2024-01-05"),
                &[],
                0.0,
                &installments_oc100(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidData(_)));

        let err = svc
            .create_order(
                &pool,
                seller_id,
                "Cliente",
                None,
                "OC-200",
                date("2024-01-05"),
                &items_widget(),
                0.0,
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidData(_)));

        assert_eq!(row_counts(&pool).await, (0, 0, 0));
    }

    #[tokio::test]
    async fn parcela_com_valor_invalido_aborta_a_ordem_inteira() {
        let pool = test_pool().await;
        let seller_id = seed_seller(&pool).await;
        let svc = service(&pool);

        let mut parcelas = installments_oc100();
        parcelas[1].amount = 0.0;

        let err = svc
            .create_order(
                &pool,
                seller_id,
                "Cliente",
                None,
                "OC-300",
                date("2024-01-05"),
                &items_widget(),
                0.0,
                &parcelas,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidData(_)));
        assert_eq!(row_counts(&pool).await, (0, 0, 0));
    }

    #[tokio::test]
    async fn transacao_descartada_nao_persiste_nada() {
        let pool = test_pool().await;
        let seller_id = seed_seller(&pool).await;
        let order_repo = OrderRepository::new(pool.clone());

        {
            let mut tx = pool.begin().await.unwrap();
            let order_id = order_repo
                .insert_order(
                    &mut *tx,
                    seller_id,
                    "Cliente",
                    None,
                    "OC-400",
                    date("2024-01-05"),
                    500.0,
                    0.0,
                )
                .await
                .unwrap();
            order_repo
                .insert_item(&mut *tx, order_id, "Widget", 500.0)
                .await
                .unwrap();
            // tx sai de escopo sem commit: rollback implícito
        }

        assert_eq!(row_counts(&pool).await, (0, 0, 0));
    }

    #[tokio::test]
    async fn excluir_ordem_remove_itens_e_parcelas_juntos() {
        let pool = test_pool().await;
        let seller_id = seed_seller(&pool).await;
        let svc = service(&pool);

        let order_id = svc
            .create_order(
                &pool,
                seller_id,
                "Cliente",
                None,
                "OC-500",
                date("2024-01-05"),
                &items_widget(),
                10.0,
                &installments_oc100(),
            )
            .await
            .unwrap();

        svc.delete_order(&pool, order_id).await.unwrap();
        assert_eq!(row_counts(&pool).await, (0, 0, 0));

        // Segunda exclusão: 404
        let err = svc.delete_order(&pool, order_id).await.unwrap_err();
        assert!(matches!(err, AppError::OrderNotFound));
    }

    #[tokio::test]
    async fn lista_de_pendentes_ignora_ordens_com_parcela_paga() {
        let pool = test_pool().await;
        let seller_id = seed_seller(&pool).await;
        let svc = service(&pool);
        let installment_repo = InstallmentRepository::new(pool.clone());
        let order_repo = OrderRepository::new(pool.clone());

        let a = svc
            .create_order(
                &pool,
                seller_id,
                "Cliente A",
                None,
                "OC-600",
                date("2024-01-05"),
                &items_widget(),
                0.0,
                &installments_oc100(),
            )
            .await
            .unwrap();
        svc.create_order(
            &pool,
            seller_id,
            "Cliente B",
            None,
            "OC-601",
            date("2024-01-06"),
            &items_widget(),
            0.0,
            &installments_oc100(),
        )
        .await
        .unwrap();

        // Uma parcela extra paga, sem ordem, não pode esvaziar a lista
        let extra = installment_repo
            .insert_extra("Taxa avulsa", 50.0, date("2024-02-01"), PaymentMethod::Other, None)
            .await
            .unwrap();
        installment_repo.settle(extra, date("2024-02-01")).await.unwrap();

        let pending = order_repo.find_pending().await.unwrap();
        assert_eq!(pending.len(), 2);

        // Baixa a primeira parcela da ordem A: ela sai da lista
        let parcela_a: i64 = sqlx::query_scalar(
            "SELECT id FROM installments WHERE order_id = ? ORDER BY due_date LIMIT 1",
        )
        .bind(a)
        .fetch_one(&pool)
        .await
        .unwrap();
        installment_repo.settle(parcela_a, date("2024-01-10")).await.unwrap();

        let pending = order_repo.find_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_number, "OC-601");
    }
}
