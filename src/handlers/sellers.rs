// src/handlers/sellers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::seller::{Seller, SellerCategory},
};

// GET /api/sellers
#[utoipa::path(
    get,
    path = "/api/sellers",
    tag = "Vendedores",
    responses((status = 200, description = "Vendedores ativos", body = Vec<Seller>))
)]
pub async fn list_active_sellers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let sellers = app_state.seller_repo.find_active().await?;
    Ok((StatusCode::OK, Json(sellers)))
}

// GET /api/sellers/all (tela de gerenciamento, inclui inativos)
#[utoipa::path(
    get,
    path = "/api/sellers/all",
    tag = "Vendedores",
    responses((status = 200, description = "Todos os vendedores", body = Vec<Seller>))
)]
pub async fn list_all_sellers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let sellers = app_state.seller_repo.find_all().await?;
    Ok((StatusCode::OK, Json(sellers)))
}

// GET /api/sellers/categories
#[utoipa::path(
    get,
    path = "/api/sellers/categories",
    tag = "Vendedores",
    responses((status = 200, description = "Categorias em uso pelos vendedores ativos", body = Vec<SellerCategory>))
)]
pub async fn list_seller_categories(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.seller_repo.find_categories().await?;
    Ok((StatusCode::OK, Json(categories)))
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSellerPayload {
    #[validate(required(message = "O campo 'name' é obrigatório."), length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,

    #[validate(required(message = "O campo 'category' é obrigatório."))]
    pub category: Option<SellerCategory>,

    // Sem meta informada, assume 0
    #[serde(default)]
    pub individual_target: f64,
}

// POST /api/sellers
#[utoipa::path(
    post,
    path = "/api/sellers",
    tag = "Vendedores",
    request_body = CreateSellerPayload,
    responses(
        (status = 200, description = "Vendedor criado", body = Seller),
        (status = 400, description = "Nome e categoria são obrigatórios")
    )
)]
pub async fn create_seller(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSellerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = payload
        .name
        .as_deref()
        .ok_or_else(|| AppError::InvalidData("name ausente.".into()))?;
    let category = payload
        .category
        .ok_or_else(|| AppError::InvalidData("category ausente.".into()))?;

    let seller = app_state
        .seller_repo
        .create(name, category, payload.individual_target)
        .await?;

    Ok((StatusCode::OK, Json(seller)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSellerPayload {
    #[validate(required(message = "O campo 'name' é obrigatório."), length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,

    #[validate(required(message = "O campo 'category' é obrigatório."))]
    pub category: Option<SellerCategory>,

    #[serde(default)]
    pub individual_target: f64,

    // Ausente = mantém ativo
    pub is_active: Option<bool>,
}

// PUT /api/sellers/{id}
#[utoipa::path(
    put,
    path = "/api/sellers/{id}",
    tag = "Vendedores",
    request_body = UpdateSellerPayload,
    responses(
        (status = 200, description = "Vendedor atualizado"),
        (status = 400, description = "Nome e categoria são obrigatórios"),
        (status = 404, description = "Vendedor não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do vendedor"))
)]
pub async fn update_seller(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSellerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = payload
        .name
        .as_deref()
        .ok_or_else(|| AppError::InvalidData("name ausente.".into()))?;
    let category = payload
        .category
        .ok_or_else(|| AppError::InvalidData("category ausente.".into()))?;

    let changes = app_state
        .seller_repo
        .update(
            id,
            name,
            category,
            payload.individual_target,
            payload.is_active.unwrap_or(true),
        )
        .await?;
    if changes == 0 {
        return Err(AppError::SellerNotFound);
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Vendedor atualizado com sucesso." })),
    ))
}

// DELETE /api/sellers/{id} (soft delete)
#[utoipa::path(
    delete,
    path = "/api/sellers/{id}",
    tag = "Vendedores",
    responses(
        (status = 200, description = "Vendedor desativado"),
        (status = 404, description = "Vendedor não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do vendedor"))
)]
pub async fn deactivate_seller(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let changes = app_state.seller_repo.deactivate(id).await?;
    if changes == 0 {
        return Err(AppError::SellerNotFound);
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Vendedor desativado com sucesso." })),
    ))
}
