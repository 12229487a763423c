pub mod seller;
pub mod order;
pub mod installment;
