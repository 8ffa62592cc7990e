//! Content generation endpoints, gated by purchased package

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::app::AppState;
use crate::http::middleware::AuthenticatedUser;
use crate::http::routes::{json_body, AppError};
use crate::payments::Feature;
use crate::util::rate_limit::check_user;

/// Rate limit, then check the user's package unlocks `feature`
async fn authorize(
    state: &AppState,
    auth: &AuthenticatedUser,
    feature: Feature,
) -> Result<(), AppError> {
    if !check_user(&state.generation_limiter, auth.user_id) {
        info!(user_id = %auth.user_id, ?feature, "Generation rate limit hit");
        return Err(AppError::TooManyRequests);
    }

    let entitlement = state
        .entitlements
        .entitlement(auth.user_id)
        .await
        .map_err(|e| AppError::internal("Failed to load profile", e))?;

    if !entitlement.allows(feature) {
        return Err(AppError::Forbidden(match entitlement.package() {
            None => "Purchase a package to unlock this feature".to_string(),
            Some(package) => format!(
                "{} does not include this feature, upgrade to unlock it",
                package.display_name()
            ),
        }));
    }

    Ok(())
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::BadRequest(format!("{} is required", field)))
    } else {
        Ok(trimmed)
    }
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Deserialize)]
pub struct AnalyzeIdeaRequest {
    #[serde(default)]
    idea: String,
    #[serde(default)]
    niche: Option<String>,
}

#[derive(Deserialize)]
pub struct BiosRequest {
    #[serde(default)]
    niche: String,
    #[serde(default)]
    vision: String,
    #[serde(default)]
    tone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintRequest {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    niche: Option<String>,
    #[serde(default)]
    duration_secs: Option<u32>,
    #[serde(default)]
    platform_split: bool,
}

#[derive(Deserialize)]
pub struct CaptionsRequest {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    tone: Option<String>,
}

#[derive(Deserialize)]
pub struct HashtagsRequest {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    niche: Option<String>,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Deserialize)]
pub struct HooksRequest {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Deserialize)]
pub struct IdeasRequest {
    #[serde(default)]
    niche: String,
    #[serde(default)]
    count: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn analyze_idea(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<AnalyzeIdeaRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let idea = required("idea", &req.idea)?;
    let niche = or_default(&req.niche, "general");

    authorize(&state, &auth, Feature::IdeaAnalysis).await?;
    Ok(Json(state.content.analyze_idea(idea, niche).await).into_response())
}

pub async fn bios(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<BiosRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let niche = required("niche", &req.niche)?;
    let vision = required("vision", &req.vision)?;
    let tone = or_default(&req.tone, "confident");

    authorize(&state, &auth, Feature::Bios).await?;
    Ok(Json(state.content.generate_vision_bios(niche, vision, tone).await).into_response())
}

pub async fn blueprint(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<BlueprintRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let topic = required("topic", &req.topic)?;
    let niche = or_default(&req.niche, "general");

    authorize(&state, &auth, Feature::Blueprints).await?;

    let response = if req.platform_split {
        Json(state.content.generate_platform_blueprints(topic, niche).await).into_response()
    } else {
        Json(
            state
                .content
                .generate_blueprint(topic, niche, req.duration_secs)
                .await,
        )
        .into_response()
    };
    Ok(response)
}

pub async fn captions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<CaptionsRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let topic = required("topic", &req.topic)?;
    let platform = or_default(&req.platform, "instagram");
    let tone = or_default(&req.tone, "engaging");

    authorize(&state, &auth, Feature::Captions).await?;
    Ok(Json(state.content.generate_captions(topic, platform, tone).await).into_response())
}

pub async fn hashtags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<HashtagsRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let topic = required("topic", &req.topic)?;
    let niche = or_default(&req.niche, "general");

    authorize(&state, &auth, Feature::Hashtags).await?;
    Ok(Json(state.content.generate_hashtags(topic, niche, req.count).await).into_response())
}

pub async fn hooks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<HooksRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let topic = required("topic", &req.topic)?;

    authorize(&state, &auth, Feature::Hooks).await?;
    Ok(Json(state.content.generate_hook_variations(topic, req.count).await).into_response())
}

pub async fn ideas(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    payload: Result<Json<IdeasRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let niche = required("niche", &req.niche)?;

    authorize(&state, &auth, Feature::ContentIdeas).await?;
    Ok(Json(state.content.generate_content_ideas(niche, req.count).await).into_response())
}
