// src/models/installment.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Enums (mapeados como TEXT no SQLite) ---

// Status persistido. 'Overdue' nunca é gravado: é derivado na leitura
// (ver DisplayStatus / display_status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum InstallmentStatus {
    #[sqlx(rename = "Pending")]
    Pending, // Pendente
    #[sqlx(rename = "Paid")]
    Paid, // Paga
}

// Método de pagamento. Os aliases aceitam as grafias localizadas que o
// painel ainda envia ("Cartão"/"Cartao", "Dinheiro", "Outro") e normalizam
// para o valor canônico antes de gravar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum PaymentMethod {
    #[sqlx(rename = "Boleto")]
    Boleto,
    #[serde(alias = "Cartão", alias = "Cartao")]
    #[sqlx(rename = "Card")]
    Card,
    #[serde(alias = "Dinheiro")]
    #[sqlx(rename = "Cash")]
    Cash,
    #[serde(alias = "Outro")]
    #[sqlx(rename = "Other")]
    Other,
}

// Status de apresentação, calculado na leitura. Nunca persistido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum DisplayStatus {
    Pending,
    Paid,
    Overdue,
}

/// Projeção pura do status de apresentação: uma parcela pendente com
/// vencimento estritamente anterior a `today` aparece como `Overdue`.
pub fn display_status(
    status: InstallmentStatus,
    due_date: NaiveDate,
    today: NaiveDate,
) -> DisplayStatus {
    match status {
        InstallmentStatus::Paid => DisplayStatus::Paid,
        InstallmentStatus::Pending if due_date < today => DisplayStatus::Overdue,
        InstallmentStatus::Pending => DisplayStatus::Pending,
    }
}

// Filtro da listagem de parcelas (query string do painel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Paid,
    Pending,
    Overdue,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InstallmentFilter {
    pub status: Option<StatusFilter>,
    // Busca textual: cliente, descrição ou número da OC
    pub search: Option<String>,
    #[param(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub seller_id: Option<i64>,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: i64,

    // NULL para contas extra (avulsas, sem ordem de compra)
    pub order_id: Option<i64>,

    // Usado por contas extra atribuídas a um vendedor
    pub seller_id: Option<i64>,

    pub description: Option<String>,

    #[schema(example = "400.00")]
    pub amount: f64,

    #[schema(value_type = String, format = Date, example = "2024-01-10")]
    pub due_date: NaiveDate,

    pub status: InstallmentStatus,

    // Não-nula se e somente se status == Paid
    #[schema(value_type = Option<String>, format = Date)]
    pub settlement_date: Option<NaiveDate>,

    pub payment_method: Option<PaymentMethod>,

    pub auto_settle: bool,
}

// Parcela de uma ordem em criação (corpo do POST /api/orders)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewInstallment {
    #[schema(example = "400.00")]
    pub amount: f64,
    #[schema(value_type = String, format = Date, example = "2024-01-10")]
    pub due_date: NaiveDate,
    pub payment_method: PaymentMethod,
}

// Linha da listagem de parcelas: parcela + dados da ordem/vendedor,
// como o painel consome. O status aqui já é o derivado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentView {
    pub id: i64,
    pub order_id: Option<i64>,
    pub description: Option<String>,
    pub amount: f64,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub status: DisplayStatus,
    #[schema(value_type = Option<String>, format = Date)]
    pub settlement_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub auto_settle: bool,
    pub order_number: Option<String>,
    pub client_name: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub order_date: Option<NaiveDate>,
    pub seller_name: Option<String>,
}

// Linha bruta da consulta, antes da projeção do status
#[derive(Debug, Clone, FromRow)]
pub struct InstallmentRow {
    pub id: i64,
    pub order_id: Option<i64>,
    pub description: Option<String>,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub settlement_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub auto_settle: bool,
    pub order_number: Option<String>,
    pub client_name: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub seller_name: Option<String>,
}

impl InstallmentRow {
    pub fn into_view(self, today: NaiveDate) -> InstallmentView {
        let status = display_status(self.status, self.due_date, today);
        InstallmentView {
            id: self.id,
            order_id: self.order_id,
            description: self.description,
            amount: self.amount,
            due_date: self.due_date,
            status,
            settlement_date: self.settlement_date,
            payment_method: self.payment_method,
            auto_settle: self.auto_settle,
            order_number: self.order_number,
            client_name: self.client_name,
            order_date: self.order_date,
            seller_name: self.seller_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn parcela_pendente_vencida_aparece_como_overdue() {
        let today = date("2024-03-15");
        assert_eq!(
            display_status(InstallmentStatus::Pending, date("2024-03-14"), today),
            DisplayStatus::Overdue
        );
        // Vence hoje: ainda pendente, não atrasada
        assert_eq!(
            display_status(InstallmentStatus::Pending, date("2024-03-15"), today),
            DisplayStatus::Pending
        );
        assert_eq!(
            display_status(InstallmentStatus::Pending, date("2024-03-16"), today),
            DisplayStatus::Pending
        );
    }

    #[test]
    fn parcela_paga_nunca_aparece_como_overdue() {
        let today = date("2024-03-15");
        assert_eq!(
            display_status(InstallmentStatus::Paid, date("2020-01-01"), today),
            DisplayStatus::Paid
        );
    }

    #[test]
    fn metodo_de_pagamento_normaliza_grafias_localizadas() {
        let card: PaymentMethod = serde_json::from_str("\"Cartão\"").unwrap();
        assert_eq!(card, PaymentMethod::Card);
        let card: PaymentMethod = serde_json::from_str("\"Cartao\"").unwrap();
        assert_eq!(card, PaymentMethod::Card);
        let cash: PaymentMethod = serde_json::from_str("\"Dinheiro\"").unwrap();
        assert_eq!(cash, PaymentMethod::Cash);
        let other: PaymentMethod = serde_json::from_str("\"Outro\"").unwrap();
        assert_eq!(other, PaymentMethod::Other);

        // Sempre serializa o valor canônico
        assert_eq!(serde_json::to_string(&PaymentMethod::Card).unwrap(), "\"Card\"");
    }

    #[test]
    fn metodo_de_pagamento_desconhecido_e_rejeitado() {
        assert!(serde_json::from_str::<PaymentMethod>("\"Cheque\"").is_err());
    }
}
