// src/lib.rs
//
// Exposto como biblioteca para os dois binários: o servidor HTTP
// (main.rs) e o job de baixa automática (bin/auto_settlement.rs).

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;
