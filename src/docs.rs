// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Ordens ---
        handlers::orders::create_order,
        handlers::orders::delete_order,
        handlers::orders::list_pending_orders,
        handlers::orders::update_order_status,

        // --- Parcelas ---
        handlers::installments::list_installments,
        handlers::installments::add_extra_charge,
        handlers::installments::settle_installment,
        handlers::installments::reverse_installment,
        handlers::installments::reschedule_due_date,
        handlers::installments::reschedule_settlement_date,
        handlers::installments::update_amount,
        handlers::installments::update_payment_method,
        handlers::installments::set_auto_settle,

        // --- Vendedores ---
        handlers::sellers::list_active_sellers,
        handlers::sellers::list_all_sellers,
        handlers::sellers::list_seller_categories,
        handlers::sellers::create_seller,
        handlers::sellers::update_seller,
        handlers::sellers::deactivate_seller,
    ),
    components(
        schemas(
            models::seller::Seller,
            models::seller::SellerCategory,
            models::order::Order,
            models::order::OrderItem,
            models::order::NewOrderItem,
            models::order::PendingOrder,
            models::installment::Installment,
            models::installment::InstallmentStatus,
            models::installment::InstallmentView,
            models::installment::DisplayStatus,
            models::installment::NewInstallment,
            models::installment::PaymentMethod,
            models::installment::StatusFilter,
        )
    ),
    tags(
        (name = "Ordens", description = "Ordens de compra: criação transacional, exclusão e pendências"),
        (name = "Parcelas", description = "Ciclo de vida das parcelas: baixa, estorno, reagendamento e baixa automática"),
        (name = "Vendedores", description = "Cadastro de vendedores")
    )
)]
pub struct ApiDoc;
