// src/handlers/mod.rs
pub mod auth;
pub mod health;
pub mod lessons;
pub mod proxy;
pub mod rpc;
pub mod upload;
