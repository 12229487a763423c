pub mod seller_repo;
pub use seller_repo::SellerRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod installment_repo;
pub use installment_repo::InstallmentRepository;
