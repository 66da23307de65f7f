use axum::{
    extract::Request,
    middleware::{from_fn, Next},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use insurai_api::database::manager::DatabaseManager;
use insurai_api::middleware::auth::jwt_auth_middleware;
use insurai_api::middleware::require_role::{require_role, ADMIN_ROLES};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, SUPABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = insurai_api::config::config();
    tracing::info!("Starting InsurAI API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("INSURAI_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 InsurAI API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(policy_public_routes())
        // Admin surface: JWT auth, then role check
        .merge(admin_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn policy_public_routes() -> Router {
    use insurai_api::handlers::policies;

    Router::new()
        .route("/policies", get(policies::list_policies))
        .route("/policies/active", get(policies::active_policies))
        .route("/policies/:id", get(policies::get_policy))
}

fn admin_routes() -> Router {
    use insurai_api::handlers::{policies, users};

    Router::new()
        // User lifecycle
        .route("/admin/users/status", put(users::update_status))
        // Policy management
        .route("/admin/policies", post(policies::create_policy))
        .route(
            "/admin/policies/:id",
            put(policies::update_policy).delete(policies::delete_policy),
        )
        .route(
            "/admin/policies/:id/documents",
            post(policies::upload_documents),
        )
        // Layers run bottom-up: JWT extraction first, then the role check
        .layer(from_fn(admin_role_middleware))
        .layer(from_fn(jwt_auth_middleware))
}

async fn admin_role_middleware(request: Request, next: Next) -> axum::response::Response {
    require_role(ADMIN_ROLES, request, next).await
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "InsurAI API",
            "version": version,
            "description": "Role-based insurance administration backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "policies": "/policies[/active|/:id] (public)",
                "admin_users": "PUT /admin/users/status (HR/ADMIN)",
                "admin_policies": "/admin/policies[/:id[/documents]] (HR/ADMIN)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
