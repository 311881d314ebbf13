use axum::http::Method;
use regex::Regex;

pub struct AdminRoute {
    pub method: Method,
    pub pattern: Regex,
}

fn admin_route(method: Method, pattern: &str) -> AdminRoute {
    AdminRoute {
        method,
        // Patterns are compile-time literals.
        pattern: Regex::new(pattern).expect("invalid admin route pattern"),
    }
}

lazy_static::lazy_static! {
    /// Method + path patterns that only admins may call.
    pub static ref ADMIN_ROUTES: Vec<AdminRoute> = vec![
        // Lesson management functions (also covers the *_with_content variants)
        admin_route(Method::POST, r"^/rpc/create_lesson"),
        admin_route(Method::POST, r"^/rpc/update_lesson"),
        admin_route(Method::POST, r"^/rpc/delete_lesson"),
        // Direct table writes
        admin_route(Method::POST, r"^/lessons$"),
        admin_route(Method::PATCH, r"^/lessons"),
        admin_route(Method::DELETE, r"^/lessons"),
        // User management
        admin_route(Method::POST, r"^/users$"),
        admin_route(Method::PATCH, r"^/users"),
        admin_route(Method::DELETE, r"^/users"),
    ];
}

pub fn is_admin_route(method: &Method, path: &str) -> bool {
    ADMIN_ROUTES
        .iter()
        .any(|route| route.method == *method && route.pattern.is_match(path))
}
