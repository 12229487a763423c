// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{installment::NewInstallment, order::NewOrderItem, order::PendingOrder},
};

// ---
// Payload: CreateOrder
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[validate(required(message = "O campo 'sellerId' é obrigatório."))]
    pub seller_id: Option<i64>,

    #[validate(required(message = "O campo 'clientName' é obrigatório."), length(min = 1, message = "O nome do cliente é obrigatório."))]
    pub client_name: Option<String>,

    pub final_client_name: Option<String>,

    #[validate(required(message = "O campo 'orderNumber' é obrigatório."), length(min = 1, message = "O número da OC é obrigatório."))]
    pub order_number: Option<String>,

    #[validate(required(message = "O campo 'orderDate' é obrigatório."))]
    #[schema(value_type = Option<String>, format = Date)]
    pub order_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "A ordem precisa de ao menos um item."))]
    pub line_items: Vec<NewOrderItem>,

    // Se o JSON não tiver esse campo, assume 0
    #[serde(default)]
    pub freight_amount: f64,

    #[validate(length(min = 1, message = "A ordem precisa de ao menos uma parcela."))]
    pub installments: Vec<NewInstallment>,
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Ordens",
    request_body = CreateOrderPayload,
    responses(
        (status = 200, description = "Ordem criada; itens e parcelas gravados na mesma transação"),
        (status = 400, description = "Campos obrigatórios ausentes"),
        (status = 409, description = "Número de OC já existe")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // Após o validate(), os required estão presentes; o ok_or cobre o
    // caminho impossível sem apelar para unwrap.
    let seller_id = payload
        .seller_id
        .ok_or_else(|| AppError::InvalidData("sellerId ausente.".into()))?;
    let client_name = payload
        .client_name
        .as_deref()
        .ok_or_else(|| AppError::InvalidData("clientName ausente.".into()))?;
    let order_number = payload
        .order_number
        .as_deref()
        .ok_or_else(|| AppError::InvalidData("orderNumber ausente.".into()))?;
    let order_date = payload
        .order_date
        .ok_or_else(|| AppError::InvalidData("orderDate ausente.".into()))?;

    let order_id = app_state
        .order_service
        .create_order(
            &app_state.db_pool,
            seller_id,
            client_name,
            payload.final_client_name.as_deref(),
            order_number,
            order_date,
            &payload.line_items,
            payload.freight_amount,
            &payload.installments,
        )
        .await?;

    Ok((StatusCode::OK, Json(json!({ "orderId": order_id }))))
}

// DELETE /api/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Ordens",
    responses(
        (status = 200, description = "Ordem, itens e parcelas excluídos"),
        (status = 404, description = "Ordem não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da ordem de compra"))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .order_service
        .delete_order(&app_state.db_pool, id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Ordem de Compra e parcelas associadas excluídas com sucesso!" })),
    ))
}

// GET /api/orders/pending
#[utoipa::path(
    get,
    path = "/api/orders/pending",
    tag = "Ordens",
    responses(
        (status = 200, description = "Ordens sem nenhuma parcela paga", body = Vec<PendingOrder>)
    )
)]
pub async fn list_pending_orders(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_repo.find_pending().await?;
    Ok((StatusCode::OK, Json(orders)))
}

// ---
// Payload: atualização de status do quadro de pendências
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusPayload {
    #[validate(required(message = "O campo 'pendingReason' é obrigatório."), length(min = 1, message = "O status é obrigatório."))]
    pub pending_reason: Option<String>,

    #[validate(required(message = "O campo 'statusColor' é obrigatório."), length(min = 1, message = "A cor é obrigatória."))]
    pub status_color: Option<String>,
}

// PATCH /api/orders/{id}/status
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    tag = "Ordens",
    request_body = UpdateOrderStatusPayload,
    responses(
        (status = 200, description = "Status atualizado"),
        (status = 400, description = "Status e cor são obrigatórios"),
        (status = 404, description = "Ordem não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da ordem de compra"))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pending_reason = payload
        .pending_reason
        .as_deref()
        .ok_or_else(|| AppError::InvalidData("pendingReason ausente.".into()))?;
    let status_color = payload
        .status_color
        .as_deref()
        .ok_or_else(|| AppError::InvalidData("statusColor ausente.".into()))?;

    let changes = app_state
        .order_repo
        .update_status(id, pending_reason, status_color)
        .await?;
    if changes == 0 {
        return Err(AppError::OrderNotFound);
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Status atualizado com sucesso.", "changes": changes })),
    ))
}
