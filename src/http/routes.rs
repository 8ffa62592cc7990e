//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::error;
use uuid::Uuid;

use crate::app::AppState;
use crate::http::generate;
use crate::http::middleware::{require_auth, AuthenticatedUser};
use crate::payments::webhook::stripe_webhook_handler;
use crate::payments::package::UnknownPackage;
use crate::payments::{Feature, Package};
use crate::streak::{streak_from_times, window_start, Streak};
use crate::util::time::uptime_secs;

/// How many days back the streak looks
const STREAK_WINDOW_DAYS: i64 = 400;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/api/debug-env", get(debug_env_handler))
        .route("/api/webhooks/stripe", post(stripe_webhook_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/checkout", post(checkout_handler))
        .route("/api/profile", get(profile_handler))
        .route("/api/streak", get(streak_handler))
        .route("/api/streak/check-in", post(check_in_handler))
        .route("/api/generate/analyze-idea", post(generate::analyze_idea))
        .route("/api/generate/bios", post(generate::bios))
        .route("/api/generate/blueprint", post(generate::blueprint))
        .route("/api/generate/captions", post(generate::captions))
        .route("/api/generate/hashtags", post(generate::hashtags))
        .route("/api/generate/hooks", post(generate::hooks))
        .route("/api/generate/ideas", post(generate::ideas))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health / diagnostics
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    live_generation: bool,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        live_generation: state.content.is_live(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DebugEnvResponse {
    openai_key_configured: bool,
    gemini_key_configured: bool,
}

/// Reports which keys are present, never their values
async fn debug_env_handler(State(state): State<AppState>) -> Json<DebugEnvResponse> {
    Json(DebugEnvResponse {
        openai_key_configured: state.config.openai_api_key.is_some(),
        gemini_key_configured: state.config.gemini_api_key.is_some(),
    })
}

// ============================================================================
// Payment endpoints
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest {
    #[serde(default)]
    package_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    session_id: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    publishable_key: Option<String>,
}

async fn checkout_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let req = json_body(payload)?;

    let package: Package = req
        .package_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|e: UnknownPackage| AppError::BadRequest(e.to_string()))?;

    let response = state
        .stripe
        .create_checkout_session(auth.user_id, package)
        .await
        .map_err(|e| {
            error!(user_id = %auth.user_id, error = %e, "Checkout session creation failed");
            AppError::Internal("Failed to create checkout session".to_string())
        })?;

    Ok(Json(CheckoutResponse {
        session_id: response.session_id,
        url: response.url,
        publishable_key: state.config.stripe_publishable_key.clone(),
    }))
}

// ============================================================================
// Profile endpoint
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    user_id: Uuid,
    has_purchased_package: bool,
    package_type: Option<Package>,
    founder_license: bool,
    features: Vec<Feature>,
}

async fn profile_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let entitlement = state
        .entitlements
        .entitlement(auth.user_id)
        .await
        .map_err(|e| AppError::internal("Failed to load profile", e))?;

    Ok(Json(ProfileResponse {
        user_id: auth.user_id,
        has_purchased_package: entitlement.package().is_some(),
        package_type: entitlement.package(),
        founder_license: entitlement.is_founder(),
        features: entitlement.features(),
    }))
}

// ============================================================================
// Streak endpoints
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckInRequest {
    #[serde(default)]
    content_type: Option<String>,
}

async fn streak_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Streak>, AppError> {
    load_streak(&state, auth.user_id).await.map(Json)
}

async fn check_in_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Option<Json<CheckInRequest>>,
) -> Result<Json<Streak>, AppError> {
    let content_type = payload
        .and_then(|Json(req)| req.content_type)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "post".to_string());

    state
        .history_store
        .record_post(auth.user_id, &content_type)
        .await
        .map_err(|e| AppError::internal("Failed to record post", e))?;

    load_streak(&state, auth.user_id).await.map(Json)
}

async fn load_streak(state: &AppState, user_id: Uuid) -> Result<Streak, AppError> {
    let today = chrono::Utc::now().date_naive();
    let times = state
        .history_store
        .post_times(user_id, window_start(today, STREAK_WINDOW_DAYS))
        .await
        .map_err(|e| AppError::internal("Failed to load posting history", e))?;

    Ok(streak_from_times(&times, today))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Log the cause and hide it from the client
    pub fn internal(message: &str, cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, "{}", message);
        AppError::Internal(message.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, slow down".to_string(),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Unwrap a JSON body, turning rejections into 400s
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
