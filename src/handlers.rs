pub mod orders;
pub mod installments;
pub mod sellers;
