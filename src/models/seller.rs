// src/models/seller.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Categoria do vendedor (mapeada como TEXT no SQLite)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum SellerCategory {
    #[sqlx(rename = "Commercial")]
    Commercial, // Comercial
    #[sqlx(rename = "Technical")]
    Technical, // Técnico
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: i64,

    #[schema(example = "Maria Souza")]
    pub name: String,

    pub category: SellerCategory,

    // Meta individual de vendas do mês
    #[schema(example = "270000.00")]
    pub individual_target: f64,

    pub is_active: bool,
}
