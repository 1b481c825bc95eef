use axum::{middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crewhub_api::handlers;
use crewhub_api::middleware::{jwt_auth_middleware, resolve_workspace_middleware};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = crewhub_api::config::config();
    tracing::info!("Starting CrewHub API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("CREWHUB_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 CrewHub API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Authenticated API: JWT first, then workspace resolution
        .merge(
            Router::new()
                .merge(context_routes())
                .merge(root_routes())
                .layer(middleware::from_fn(resolve_workspace_middleware))
                .layer(middleware::from_fn(jwt_auth_middleware)),
        )
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn context_routes() -> Router {
    use axum::routing::post;
    use handlers::protected;

    Router::new()
        // Resolved-context introspection and workspace switching
        .route("/api/auth/whoami", get(protected::whoami))
        .route("/api/auth/workspaces", get(protected::workspaces))
        .route(
            "/api/auth/workspace/:id/switch",
            post(protected::switch_workspace),
        )
}

fn root_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::elevated;

    Router::new()
        // Workspace registry administration (superuser)
        .route(
            "/api/root/workspace",
            post(elevated::workspace_create).get(elevated::workspace_list),
        )
        .route("/api/root/workspace/:id", get(elevated::workspace_show))
        .route(
            "/api/root/workspace/:id/activate",
            put(elevated::workspace_activate),
        )
        .route(
            "/api/root/workspace/:id/deactivate",
            put(elevated::workspace_deactivate),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "CrewHub API",
            "version": version,
            "description": "Multi-tenant workforce management backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "whoami": "/api/auth/whoami (protected)",
                "workspaces": "/api/auth/workspaces (protected)",
                "switch": "/api/auth/workspace/:id/switch (protected)",
                "root": "/api/root/workspace[/:id] (restricted, requires superuser)",
            },
            "workspace_override_header": crewhub_api::config::config().api.workspace_header,
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crewhub_api::database::manager::DatabaseManager::health_check().await {
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
