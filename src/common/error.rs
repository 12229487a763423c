use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campo obrigatório ausente fora do alcance do `validator`
    // (ex.: parcela sem vencimento dentro da lista de uma ordem)
    #[error("Dados inválidos: {0}")]
    InvalidData(String),

    #[error("Número de OC já existe")]
    OrderNumberTaken,

    #[error("Ordem de compra não encontrada")]
    OrderNotFound,

    #[error("Parcela não encontrada")]
    InstallmentNotFound,

    #[error("Vendedor não encontrado")]
    SellerNotFound,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Converte violação de chave única do `order_number` no erro de
    /// conflito correspondente; os demais erros de banco passam direto.
    pub fn from_order_insert(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::OrderNumberTaken;
            }
        }
        AppError::DatabaseError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidData(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::OrderNumberTaken => {
                (StatusCode::CONFLICT, "Este número de OC já está em uso.")
            }
            AppError::OrderNotFound => {
                (StatusCode::NOT_FOUND, "Ordem de Compra não encontrada.")
            }
            AppError::InstallmentNotFound => {
                (StatusCode::NOT_FOUND, "Parcela não encontrada ou já paga.")
            }
            AppError::SellerNotFound => (StatusCode::NOT_FOUND, "Vendedor não encontrado."),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; a resposta fica opaca.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
