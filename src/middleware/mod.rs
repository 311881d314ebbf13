pub mod admin;
pub mod auth;
pub mod lesson_access;
pub mod logging;
pub mod rbac;
