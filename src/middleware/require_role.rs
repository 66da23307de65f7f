use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// Role labels allowed to reach the admin surface
pub const ADMIN_ROLES: &[&str] = &["HR", "ADMIN"];

/// Route-group authorization: the request's authenticated role must be in
/// the allowed set. Runs after `jwt_auth_middleware`, which injects the
/// `AuthUser` extension.
pub async fn require_role(
    allowed: &'static [&'static str],
    request: Request,
    next: Next,
) -> Response {
    let Some(auth_user) = request.extensions().get::<AuthUser>() else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    if !role_allowed(&auth_user.role, allowed) {
        tracing::warn!(
            "Role '{}' denied for {} {}",
            auth_user.role,
            request.method(),
            request.uri().path()
        );
        return ApiError::forbidden(format!(
            "Role '{}' is not permitted to access this resource",
            auth_user.role
        ))
        .into_response();
    }

    next.run(request).await
}

fn role_allowed(role: &str, allowed: &[&str]) -> bool {
    allowed.iter().any(|r| role.eq_ignore_ascii_case(r))
}
