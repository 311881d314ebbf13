// src/models/mod.rs
pub mod api;
pub mod auth;
pub mod lesson;
pub mod upload;
