// src/services/installment_service.rs

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::{
    common::error::AppError,
    db::InstallmentRepository,
    models::installment::{InstallmentFilter, InstallmentView, PaymentMethod},
};

// Resumo de uma execução da varredura de baixa automática
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweepSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

// O "ledger" de parcelas: ciclo de vida de cada parcela, da criação à
// baixa (manual ou automática) e eventual estorno.
#[derive(Clone)]
pub struct InstallmentService {
    repo: InstallmentRepository,
}

impl InstallmentService {
    pub fn new(repo: InstallmentRepository) -> Self {
        Self { repo }
    }

    /// Baixa manual: Pendente -> Paga. Sem data informada, paga hoje.
    pub async fn settle(
        &self,
        id: i64,
        settlement_date: Option<NaiveDate>,
    ) -> Result<u64, AppError> {
        let date = settlement_date.unwrap_or_else(|| Local::now().date_naive());
        self.repo.settle(id, date).await
    }

    /// Estorno: Paga -> Pendente, limpa a data de pagamento. Chamável em
    /// qualquer estado; estornar duas vezes dá no mesmo.
    pub async fn reverse(&self, id: i64) -> Result<u64, AppError> {
        self.repo.reverse(id).await
    }

    /// Muda a data de vencimento sem tocar no status.
    pub async fn reschedule_due_date(
        &self,
        id: i64,
        new_date: NaiveDate,
    ) -> Result<u64, AppError> {
        self.repo.update_due_date(id, new_date).await
    }

    /// Muda a data de liquidação sem validar o status atual; o valor do
    /// campo numa parcela pendente é responsabilidade de quem chama.
    pub async fn reschedule_settlement_date(
        &self,
        id: i64,
        new_date: NaiveDate,
    ) -> Result<u64, AppError> {
        self.repo.update_settlement_date(id, new_date).await
    }

    pub async fn update_amount(&self, id: i64, new_amount: f64) -> Result<(), AppError> {
        if new_amount <= 0.0 {
            return Err(AppError::InvalidData("Valor inválido.".into()));
        }
        let changes = self.repo.update_amount(id, new_amount).await?;
        if changes == 0 {
            return Err(AppError::InstallmentNotFound);
        }
        Ok(())
    }

    pub async fn update_payment_method(
        &self,
        id: i64,
        new_method: PaymentMethod,
    ) -> Result<(), AppError> {
        let changes = self.repo.update_payment_method(id, new_method).await?;
        if changes == 0 {
            return Err(AppError::InstallmentNotFound);
        }
        Ok(())
    }

    /// Liga/desliga a baixa automática. Ao ligar, a parcela precisa estar
    /// pendente e é liquidada imediatamente na própria data de vencimento
    /// (comportamento herdado do painel; ver DESIGN.md). Ao desligar, a
    /// parcela volta a pendente com a data de pagamento limpa, sempre.
    pub async fn set_auto_settle(&self, id: i64, enabled: bool) -> Result<(), AppError> {
        if enabled {
            let due_date = self
                .repo
                .find_pending_due_date(id)
                .await?
                .ok_or(AppError::InstallmentNotFound)?;
            self.repo.enable_auto_settle(id, due_date).await?;
            tracing::info!(id, %due_date, "Baixa automática ativada e parcela liquidada");
        } else {
            self.repo.disable_auto_settle(id).await?;
            tracing::info!(id, "Baixa automática desativada, parcela estornada");
        }
        Ok(())
    }

    /// Conta extra: parcela avulsa, sem ordem de compra, sempre Pendente.
    pub async fn add_extra_charge(
        &self,
        description: &str,
        amount: f64,
        due_date: NaiveDate,
        payment_method: Option<PaymentMethod>,
        seller_id: Option<i64>,
    ) -> Result<i64, AppError> {
        if amount <= 0.0 {
            return Err(AppError::InvalidData(
                "O valor da conta extra precisa ser maior que zero.".into(),
            ));
        }
        let method = payment_method.unwrap_or(PaymentMethod::Other);
        self.repo
            .insert_extra(description, amount, due_date, method, seller_id)
            .await
    }

    /// Listagem filtrada, com o status derivado projetado por linha:
    /// pendente vencida aparece como Overdue, sem mutação no banco.
    pub async fn list(&self, filter: &InstallmentFilter) -> Result<Vec<InstallmentView>, AppError> {
        let today = Local::now().date_naive();
        self.list_as_of(filter, today).await
    }

    pub async fn list_as_of(
        &self,
        filter: &InstallmentFilter,
        today: NaiveDate,
    ) -> Result<Vec<InstallmentView>, AppError> {
        let rows = self.repo.list(filter, today).await?;
        Ok(rows.into_iter().map(|row| row.into_view(today)).collect())
    }

    /// Varredura de baixa automática: liquida toda parcela pendente com a
    /// flag ligada e vencimento até `today`, cada uma de forma
    /// independente. Falha em uma linha não interrompe as demais; a
    /// varredura acumula e reporta os contadores.
    pub async fn run_auto_settlement_sweep(
        &self,
        today: NaiveDate,
    ) -> Result<SweepSummary, AppError> {
        let candidates = self.repo.find_auto_settleable(today).await?;

        if candidates.is_empty() {
            tracing::info!("Nenhuma parcela encontrada para baixa automática.");
            return Ok(SweepSummary {
                processed: 0,
                succeeded: 0,
                failed: 0,
            });
        }

        tracing::info!(
            "Encontradas {} parcela(s) para baixa automática",
            candidates.len()
        );

        let mut succeeded = 0;
        let mut failed = 0;

        for parcela in &candidates {
            match self.repo.auto_settle_one(parcela.id).await {
                Ok(_) => {
                    tracing::info!(
                        id = parcela.id,
                        valor = parcela.amount,
                        vencimento = %parcela.due_date,
                        "Parcela baixada automaticamente"
                    );
                    succeeded += 1;
                }
                Err(err) => {
                    tracing::error!(id = parcela.id, "Erro ao baixar parcela: {}", err);
                    failed += 1;
                }
            }
        }

        Ok(SweepSummary {
            processed: candidates.len(),
            succeeded,
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::installment::{DisplayStatus, StatusFilter};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    fn service(pool: &SqlitePool) -> InstallmentService {
        InstallmentService::new(InstallmentRepository::new(pool.clone()))
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    // (status, settlement_date) direto do banco
    async fn stored_state(pool: &SqlitePool, id: i64) -> (String, Option<NaiveDate>) {
        sqlx::query_as("SELECT status, settlement_date FROM installments WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn set_auto_flag(pool: &SqlitePool, id: i64) {
        sqlx::query("UPDATE installments SET auto_settle = 1 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn conta_extra_nasce_pendente_e_sem_ordem() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let id = svc
            .add_extra_charge("Bank fee", 50.0, date("2024-02-01"), Some(PaymentMethod::Other), None)
            .await
            .unwrap();

        let (order_id, status): (Option<i64>, String) =
            sqlx::query_as("SELECT order_id, status FROM installments WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(order_id, None);
        assert_eq!(status, "Pending");
    }

    #[tokio::test]
    async fn conta_extra_com_valor_zero_e_rejeitada() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let err = svc
            .add_extra_charge("Taxa", 0.0, date("2024-02-01"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidData(_)));
    }

    #[tokio::test]
    async fn baixa_e_estorno_mantem_o_invariante_da_data_de_pagamento() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let id = svc
            .add_extra_charge("Taxa", 80.0, date("2024-03-01"), None, None)
            .await
            .unwrap();

        // Paga <=> data de pagamento presente, após cada transição
        svc.settle(id, Some(date("2024-03-05"))).await.unwrap();
        assert_eq!(
            stored_state(&pool, id).await,
            ("Paid".into(), Some(date("2024-03-05")))
        );

        svc.reverse(id).await.unwrap();
        assert_eq!(stored_state(&pool, id).await, ("Pending".into(), None));

        // Estorno é idempotente
        svc.reverse(id).await.unwrap();
        assert_eq!(stored_state(&pool, id).await, ("Pending".into(), None));
    }

    #[tokio::test]
    async fn reagendamentos_nao_mudam_o_status() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let id = svc
            .add_extra_charge("Taxa", 80.0, date("2024-03-01"), None, None)
            .await
            .unwrap();

        let changes = svc.reschedule_due_date(id, date("2024-04-01")).await.unwrap();
        assert_eq!(changes, 1);
        let (status, _) = stored_state(&pool, id).await;
        assert_eq!(status, "Pending");

        let changes = svc
            .reschedule_settlement_date(id, date("2024-04-02"))
            .await
            .unwrap();
        assert_eq!(changes, 1);
        let (status, settlement) = stored_state(&pool, id).await;
        assert_eq!(status, "Pending");
        assert_eq!(settlement, Some(date("2024-04-02")));

        // Parcela inexistente: zero linhas afetadas, sem erro
        let changes = svc.reschedule_due_date(9999, date("2024-04-01")).await.unwrap();
        assert_eq!(changes, 0);
    }

    #[tokio::test]
    async fn ativar_baixa_automatica_liquida_na_data_de_vencimento() {
        let pool = test_pool().await;
        let svc = service(&pool);

        // Vencimento no passado: liquida imediatamente, como se fosse na data
        let id = svc
            .add_extra_charge("Antiga", 120.0, date("2023-01-01"), None, None)
            .await
            .unwrap();

        svc.set_auto_settle(id, true).await.unwrap();
        assert_eq!(
            stored_state(&pool, id).await,
            ("Paid".into(), Some(date("2023-01-01")))
        );

        // Ativar de novo em uma parcela já paga: 404
        let err = svc.set_auto_settle(id, true).await.unwrap_err();
        assert!(matches!(err, AppError::InstallmentNotFound));

        // Desativar força a volta para pendente
        svc.set_auto_settle(id, false).await.unwrap();
        assert_eq!(stored_state(&pool, id).await, ("Pending".into(), None));
    }

    #[tokio::test]
    async fn varredura_baixa_somente_as_elegiveis() {
        let pool = test_pool().await;
        let svc = service(&pool);
        let today = date("2024-06-15");

        // Elegível: pendente, flag ligada, vencida
        let eligible = svc
            .add_extra_charge("Vencida", 100.0, date("2024-06-10"), None, None)
            .await
            .unwrap();
        set_auto_flag(&pool, eligible).await;

        // Vence hoje: também elegível
        let due_today = svc
            .add_extra_charge("Vence hoje", 100.0, today, None, None)
            .await
            .unwrap();
        set_auto_flag(&pool, due_today).await;

        // Flag ligada mas vencimento futuro: fica
        let future = svc
            .add_extra_charge("Futura", 100.0, date("2024-07-01"), None, None)
            .await
            .unwrap();
        set_auto_flag(&pool, future).await;

        // Vencida sem flag: fica
        let no_flag = svc
            .add_extra_charge("Sem flag", 100.0, date("2024-06-01"), None, None)
            .await
            .unwrap();

        let summary = svc.run_auto_settlement_sweep(today).await.unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);

        assert_eq!(
            stored_state(&pool, eligible).await,
            ("Paid".into(), Some(date("2024-06-10")))
        );
        assert_eq!(
            stored_state(&pool, due_today).await,
            ("Paid".into(), Some(today))
        );
        assert_eq!(stored_state(&pool, future).await.0, "Pending");
        assert_eq!(stored_state(&pool, no_flag).await.0, "Pending");

        // A flag das baixadas foi limpa
        let flag: bool = sqlx::query_scalar("SELECT auto_settle FROM installments WHERE id = ?")
            .bind(eligible)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(!flag);
    }

    #[tokio::test]
    async fn varredura_repetida_nao_baixa_duas_vezes() {
        let pool = test_pool().await;
        let svc = service(&pool);
        let today = date("2024-06-15");

        let id = svc
            .add_extra_charge("Vencida", 100.0, date("2024-06-10"), None, None)
            .await
            .unwrap();
        set_auto_flag(&pool, id).await;

        let first = svc.run_auto_settlement_sweep(today).await.unwrap();
        assert_eq!(first.processed, 1);
        assert_eq!(first.succeeded, 1);

        let second = svc.run_auto_settlement_sweep(today).await.unwrap();
        assert_eq!(second.processed, 0);
    }

    #[tokio::test]
    async fn listagem_projeta_overdue_sem_gravar() {
        let pool = test_pool().await;
        let svc = service(&pool);
        let today = date("2024-06-15");

        let overdue = svc
            .add_extra_charge("Vencida", 100.0, date("2024-06-01"), None, None)
            .await
            .unwrap();
        let upcoming = svc
            .add_extra_charge("Futura", 100.0, date("2024-07-01"), None, None)
            .await
            .unwrap();
        let paid = svc
            .add_extra_charge("Paga", 100.0, date("2024-06-05"), None, None)
            .await
            .unwrap();
        svc.settle(paid, Some(date("2024-06-05"))).await.unwrap();

        let all = svc
            .list_as_of(&InstallmentFilter::default(), today)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let by_id = |id: i64| all.iter().find(|v| v.id == id).unwrap();
        assert_eq!(by_id(overdue).status, DisplayStatus::Overdue);
        assert_eq!(by_id(upcoming).status, DisplayStatus::Pending);
        assert_eq!(by_id(paid).status, DisplayStatus::Paid);

        // O status gravado continua 'Pending': Overdue é só projeção
        assert_eq!(stored_state(&pool, overdue).await.0, "Pending");

        // Filtros de status derivado
        let filter = InstallmentFilter {
            status: Some(StatusFilter::Overdue),
            ..Default::default()
        };
        let only_overdue = svc.list_as_of(&filter, today).await.unwrap();
        assert_eq!(only_overdue.len(), 1);
        assert_eq!(only_overdue[0].id, overdue);

        let filter = InstallmentFilter {
            status: Some(StatusFilter::Pending),
            ..Default::default()
        };
        let only_pending = svc.list_as_of(&filter, today).await.unwrap();
        assert_eq!(only_pending.len(), 1);
        assert_eq!(only_pending[0].id, upcoming);
    }

    #[tokio::test]
    async fn listagem_filtra_por_busca_e_periodo() {
        let pool = test_pool().await;
        let svc = service(&pool);
        let today = date("2024-06-15");

        svc.add_extra_charge("Taxa bancária", 50.0, date("2024-06-10"), None, None)
            .await
            .unwrap();
        svc.add_extra_charge("Frete extra", 70.0, date("2024-08-10"), None, None)
            .await
            .unwrap();

        let filter = InstallmentFilter {
            search: Some("bancária".into()),
            ..Default::default()
        };
        let found = svc.list_as_of(&filter, today).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description.as_deref(), Some("Taxa bancária"));

        let filter = InstallmentFilter {
            start_date: Some(date("2024-08-01")),
            end_date: Some(date("2024-08-31")),
            ..Default::default()
        };
        let in_range = svc.list_as_of(&filter, today).await.unwrap();
        assert_eq!(in_range.len(), 1);
        assert_eq!(in_range[0].description.as_deref(), Some("Frete extra"));
    }

    #[tokio::test]
    async fn atualizacoes_de_valor_e_metodo_exigem_parcela_existente() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let id = svc
            .add_extra_charge("Taxa", 80.0, date("2024-03-01"), None, None)
            .await
            .unwrap();

        svc.update_amount(id, 95.5).await.unwrap();
        let amount: f64 = sqlx::query_scalar("SELECT amount FROM installments WHERE id = ?")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(amount, 95.5);

        let err = svc.update_amount(id, -1.0).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidData(_)));

        let err = svc.update_amount(9999, 10.0).await.unwrap_err();
        assert!(matches!(err, AppError::InstallmentNotFound));

        svc.update_payment_method(id, PaymentMethod::Boleto).await.unwrap();
        let err = svc
            .update_payment_method(9999, PaymentMethod::Boleto)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InstallmentNotFound));
    }
}
