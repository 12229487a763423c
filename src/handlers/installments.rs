// src/handlers/installments.rs

use axum::{
    extract::{Path, Query, State},
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
    models::installment::{InstallmentFilter, InstallmentView, PaymentMethod},
};

// GET /api/installments
#[utoipa::path(
    get,
    path = "/api/installments",
    tag = "Parcelas",
    params(InstallmentFilter),
    responses(
        (status = 200, description = "Parcelas com o status derivado (pendente vencida vira Overdue)", body = Vec<InstallmentView>)
    )
)]
pub async fn list_installments(
    State(app_state): State<AppState>,
    Query(filter): Query<InstallmentFilter>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.installment_service.list(&filter).await?;
    Ok((StatusCode::OK, Json(rows)))
}

// ---
// Payload: conta extra (parcela avulsa)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtraChargePayload {
    #[validate(required(message = "O campo 'description' é obrigatório."), length(min = 1, message = "A descrição é obrigatória."))]
    pub description: Option<String>,

    #[validate(required(message = "O campo 'amount' é obrigatório."))]
    pub amount: Option<f64>,

    #[validate(required(message = "O campo 'dueDate' é obrigatório."))]
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    pub payment_method: Option<PaymentMethod>,

    pub seller_id: Option<i64>,
}

// POST /api/installments/extra
#[utoipa::path(
    post,
    path = "/api/installments/extra",
    tag = "Parcelas",
    request_body = ExtraChargePayload,
    responses(
        (status = 201, description = "Conta extra criada como parcela avulsa pendente"),
        (status = 400, description = "Campos obrigatórios faltando")
    )
)]
pub async fn add_extra_charge(
    State(app_state): State<AppState>,
    Json(payload): Json<ExtraChargePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let description = payload
        .description
        .as_deref()
        .ok_or_else(|| AppError::InvalidData("description ausente.".into()))?;
    let amount = payload
        .amount
        .ok_or_else(|| AppError::InvalidData("amount ausente.".into()))?;
    let due_date = payload
        .due_date
        .ok_or_else(|| AppError::InvalidData("dueDate ausente.".into()))?;

    let installment_id = app_state
        .installment_service
        .add_extra_charge(
            description,
            amount,
            due_date,
            payload.payment_method,
            payload.seller_id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Conta extra adicionada com sucesso.",
            "installmentId": installment_id
        })),
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlePayload {
    // Sem data informada, a baixa é datada de hoje
    #[schema(value_type = Option<String>, format = Date)]
    pub settlement_date: Option<NaiveDate>,
}

// PUT /api/installments/{id}/settle
#[utoipa::path(
    put,
    path = "/api/installments/{id}/settle",
    tag = "Parcelas",
    request_body = SettlePayload,
    responses((status = 200, description = "Parcela baixada")),
    params(("id" = i64, Path, description = "ID da parcela"))
)]
pub async fn settle_installment(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SettlePayload>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state
        .installment_service
        .settle(id, payload.settlement_date)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Parcela baixada com sucesso.", "changes": changes })),
    ))
}

// PUT /api/installments/{id}/reverse
#[utoipa::path(
    put,
    path = "/api/installments/{id}/reverse",
    tag = "Parcelas",
    responses((status = 200, description = "Parcela estornada")),
    params(("id" = i64, Path, description = "ID da parcela"))
)]
pub async fn reverse_installment(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state.installment_service.reverse(id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Parcela estornada com sucesso.", "changes": changes })),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleDueDatePayload {
    #[validate(required(message = "A nova data de vencimento é obrigatória."))]
    #[schema(value_type = Option<String>, format = Date)]
    pub new_due_date: Option<NaiveDate>,
}

// PATCH /api/installments/{id}/due-date
#[utoipa::path(
    patch,
    path = "/api/installments/{id}/due-date",
    tag = "Parcelas",
    request_body = RescheduleDueDatePayload,
    responses(
        (status = 200, description = "Data de vencimento atualizada"),
        (status = 400, description = "Nova data ausente")
    ),
    params(("id" = i64, Path, description = "ID da parcela"))
)]
pub async fn reschedule_due_date(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RescheduleDueDatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let new_date = payload
        .new_due_date
        .ok_or_else(|| AppError::InvalidData("newDueDate ausente.".into()))?;

    let changes = app_state
        .installment_service
        .reschedule_due_date(id, new_date)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Data de vencimento atualizada com sucesso.", "changes": changes })),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleSettlementDatePayload {
    #[validate(required(message = "A nova data de liquidação é obrigatória."))]
    #[schema(value_type = Option<String>, format = Date)]
    pub new_settlement_date: Option<NaiveDate>,
}

// PATCH /api/installments/{id}/settlement-date
#[utoipa::path(
    patch,
    path = "/api/installments/{id}/settlement-date",
    tag = "Parcelas",
    request_body = RescheduleSettlementDatePayload,
    responses(
        (status = 200, description = "Data de liquidação atualizada"),
        (status = 400, description = "Nova data ausente")
    ),
    params(("id" = i64, Path, description = "ID da parcela"))
)]
pub async fn reschedule_settlement_date(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RescheduleSettlementDatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let new_date = payload
        .new_settlement_date
        .ok_or_else(|| AppError::InvalidData("newSettlementDate ausente.".into()))?;

    let changes = app_state
        .installment_service
        .reschedule_settlement_date(id, new_date)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Data de liquidação atualizada com sucesso.", "changes": changes })),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAmountPayload {
    #[validate(required(message = "O novo valor é obrigatório."))]
    pub new_amount: Option<f64>,
}

// PATCH /api/installments/{id}/amount
#[utoipa::path(
    patch,
    path = "/api/installments/{id}/amount",
    tag = "Parcelas",
    request_body = UpdateAmountPayload,
    responses(
        (status = 200, description = "Valor atualizado"),
        (status = 400, description = "Valor inválido"),
        (status = 404, description = "Parcela não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da parcela"))
)]
pub async fn update_amount(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAmountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let new_amount = payload
        .new_amount
        .ok_or_else(|| AppError::InvalidData("newAmount ausente.".into()))?;

    app_state
        .installment_service
        .update_amount(id, new_amount)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Valor da parcela atualizado com sucesso." })),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentMethodPayload {
    #[validate(required(message = "O novo tipo de pagamento é obrigatório."))]
    pub new_method: Option<PaymentMethod>,
}

// PATCH /api/installments/{id}/payment-method
#[utoipa::path(
    patch,
    path = "/api/installments/{id}/payment-method",
    tag = "Parcelas",
    request_body = UpdatePaymentMethodPayload,
    responses(
        (status = 200, description = "Tipo de pagamento atualizado"),
        (status = 404, description = "Parcela não encontrada")
    ),
    params(("id" = i64, Path, description = "ID da parcela"))
)]
pub async fn update_payment_method(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePaymentMethodPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let new_method = payload
        .new_method
        .ok_or_else(|| AppError::InvalidData("newMethod ausente.".into()))?;

    app_state
        .installment_service
        .update_payment_method(id, new_method)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Tipo de pagamento atualizado com sucesso." })),
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoSettlePayload {
    #[validate(required(message = "O campo 'enabled' é obrigatório."))]
    pub enabled: Option<bool>,
}

// PATCH /api/installments/{id}/auto-settle
#[utoipa::path(
    patch,
    path = "/api/installments/{id}/auto-settle",
    tag = "Parcelas",
    request_body = AutoSettlePayload,
    responses(
        (status = 200, description = "Baixa automática atualizada"),
        (status = 404, description = "Parcela não encontrada ou já paga")
    ),
    params(("id" = i64, Path, description = "ID da parcela"))
)]
pub async fn set_auto_settle(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AutoSettlePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let enabled = payload
        .enabled
        .ok_or_else(|| AppError::InvalidData("enabled ausente.".into()))?;

    app_state.installment_service.set_auto_settle(id, enabled).await?;

    let message = if enabled {
        "Baixa automática realizada com sucesso na data de vencimento."
    } else {
        "Baixa automática desativada com sucesso."
    };
    Ok((StatusCode::OK, Json(json!({ "message": message }))))
}
