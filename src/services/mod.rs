// src/services/mod.rs
pub mod lesson_service;
pub mod token_verifier;
