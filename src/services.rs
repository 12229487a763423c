pub mod order_service;
pub use order_service::OrderService;
pub mod installment_service;
pub use installment_service::InstallmentService;
