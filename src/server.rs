use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::catalog::{Catalog, VALID_CATEGORIES};
use crate::chat::ChatResponder;

#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<ChatResponder>,
    pub catalog: Arc<Catalog>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    generate_image: bool,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    on_topic: bool,
    image_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

pub async fn run_server(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/materials/catalog", get(materials_catalog))
        .route("/materials/{category}", get(materials_by_category))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Finish design API listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Finish Design API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Chat and design generation for architectural finishes",
        "endpoints": {
            "POST /chat": "Send a chat message",
            "GET /health": "Service health check",
            "GET /materials/catalog": "Full materials catalog",
            "GET /materials/{category}": "Materials in a fixed category",
        },
        "categories": VALID_CATEGORIES,
    }))
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        message: "Finish design service is running",
    })
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> impl IntoResponse {
    info!(
        "Chat request: generate_image={}, message_chars={}",
        request.generate_image,
        request.message.chars().count()
    );
    let reply = state
        .responder
        .process(&request.message, request.generate_image)
        .await;

    Json(ChatResponse {
        response: reply.response,
        on_topic: reply.on_topic,
        image_path: reply.image_path.map(|path| path.display().to_string()),
    })
}

async fn materials_catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog.as_ref().clone())
}

async fn materials_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    match state.catalog.materials_by_category(&category) {
        Some(materials) => {
            let materials: Vec<_> = materials.into_iter().cloned().collect();
            (
                StatusCode::OK,
                Json(json!({ "category": category, "materials": materials })),
            )
        }
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "detail": format!(
                    "Invalid category '{category}'. Valid categories: {}",
                    VALID_CATEGORIES.join(", ")
                ),
            })),
        ),
    }
}
