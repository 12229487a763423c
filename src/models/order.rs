// src/models/order.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,

    pub seller_id: i64,

    #[schema(example = "Metalúrgica Aurora")]
    pub client_name: String,

    // Cliente final, quando a venda passa por um intermediário
    pub final_client_name: Option<String>,

    #[schema(example = "OC-100")]
    pub order_number: String,

    #[schema(value_type = String, format = Date, example = "2024-01-05")]
    pub order_date: NaiveDate,

    // Derivado na criação: soma dos itens. Nunca recalculado depois.
    #[schema(example = "600.00")]
    pub total_amount: f64,

    #[schema(example = "35.00")]
    pub freight_amount: f64,

    // Rótulo + cor usados pelo quadro de acompanhamento do painel
    #[schema(example = "Pagamento Pendente")]
    pub pending_reason: String,

    #[schema(example = "#ffc107")]
    pub status_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,

    pub order_id: i64,

    // Nome livre, desnormalizado (não referencia catálogo de produtos)
    #[schema(example = "Widget")]
    pub product_name: String,

    #[schema(example = "500.00")]
    pub amount: f64,
}

// Item de uma ordem em criação (corpo do POST /api/orders)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    #[schema(example = "Widget")]
    pub name: String,
    #[schema(example = "500.00")]
    pub amount: f64,
}

// Projeção usada pela lista de ordens pendentes do painel
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub id: i64,
    pub order_number: String,
    pub client_name: String,
    pub total_amount: f64,
    pub pending_reason: String,
    pub status_color: String,
    pub seller_name: Option<String>,
}
