// src/main.rs

use axum::{
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use placar_fluxo_backend::config::AppState;
use placar_fluxo_backend::docs::ApiDoc;
use placar_fluxo_backend::handlers;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let order_routes = Router::new()
        .route("/", post(handlers::orders::create_order))
        .route("/pending", get(handlers::orders::list_pending_orders))
        .route("/{id}", delete(handlers::orders::delete_order))
        .route("/{id}/status", patch(handlers::orders::update_order_status));

    let installment_routes = Router::new()
        .route("/", get(handlers::installments::list_installments))
        .route("/extra", post(handlers::installments::add_extra_charge))
        .route("/{id}/settle", put(handlers::installments::settle_installment))
        .route("/{id}/reverse", put(handlers::installments::reverse_installment))
        .route("/{id}/due-date", patch(handlers::installments::reschedule_due_date))
        .route(
            "/{id}/settlement-date",
            patch(handlers::installments::reschedule_settlement_date),
        )
        .route("/{id}/amount", patch(handlers::installments::update_amount))
        .route(
            "/{id}/payment-method",
            patch(handlers::installments::update_payment_method),
        )
        .route("/{id}/auto-settle", patch(handlers::installments::set_auto_settle));

    let seller_routes = Router::new()
        .route(
            "/",
            post(handlers::sellers::create_seller).get(handlers::sellers::list_active_sellers),
        )
        .route("/all", get(handlers::sellers::list_all_sellers))
        .route("/categories", get(handlers::sellers::list_seller_categories))
        .route(
            "/{id}",
            put(handlers::sellers::update_seller)
                .delete(handlers::sellers::deactivate_seller),
        );

    // Combina tudo no router principal. O painel roda em outra origem,
    // então o CORS fica liberado.
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api/orders", order_routes)
        .nest("/api/installments", installment_routes)
        .nest("/api/sellers", seller_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3001";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!(
        "🚀 Servidor escutando em {}",
        listener.local_addr().expect("endereço local indisponível")
    );
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
