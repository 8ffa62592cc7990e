//! Stripe webhook handler with signature verification

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::package::Package;
use crate::app::AppState;
use crate::store::supabase::SupabaseError;

type HmacSha256 = Hmac<Sha256>;

/// Processed events are forgotten after a day
const LEDGER_RETENTION_SECS: i64 = 24 * 60 * 60;

/// Handle Stripe webhook events
pub async fn stripe_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookError> {
    // Get the stripe-signature header
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;

    // Get the raw body as string for verification
    let payload = std::str::from_utf8(&body).map_err(|_| WebhookError::InvalidPayload)?;

    // Verify webhook signature
    verify_stripe_signature(
        payload,
        signature,
        &state.config.stripe_webhook_secret,
        state.config.stripe_webhook_tolerance_secs,
        chrono::Utc::now().timestamp(),
    )?;

    // Parse the event
    let event: StripeEvent = serde_json::from_str(payload).map_err(|e| {
        error!(error = %e, "Failed to parse Stripe event");
        WebhookError::InvalidPayload
    })?;

    info!(
        event_type = %event.event_type,
        event_id = %event.id,
        "Received Stripe webhook"
    );

    if state.webhook_ledger.seen(&event.id) {
        info!(event_id = %event.id, "Event already processed (idempotent)");
        return Ok(received());
    }

    // Handle the event
    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let session: CheckoutSessionData = serde_json::from_value(event.data.object)
                .map_err(|e| {
                    error!(error = %e, "Malformed checkout session object");
                    WebhookError::InvalidPayload
                })?;
            handle_checkout_completed(&state, &session).await?;
        }
        _ => {
            info!(event_type = %event.event_type, "Unhandled event type");
        }
    }

    state
        .webhook_ledger
        .record(&event.id, chrono::Utc::now().timestamp());

    Ok(received())
}

fn received() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "received": true })))
}

/// Verify a `t=...,v1=...` Stripe signature header
pub fn verify_stripe_signature(
    payload: &str,
    signature_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), WebhookError> {
    // Parse signature header
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let mut kv = part.trim().splitn(2, '=');
        if let (Some(key), Some(value)) = (kv.next(), kv.next()) {
            match key {
                "t" => timestamp = Some(value),
                "v1" => signatures.push(value),
                _ => {}
            }
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::InvalidSignature)?;
    if signatures.is_empty() {
        return Err(WebhookError::InvalidSignature);
    }

    // Create signed payload
    let signed_payload = format!("{}.{}", timestamp, payload);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(signed_payload.as_bytes());

    // Constant-time comparison against each candidate
    let valid = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !valid {
        return Err(WebhookError::InvalidSignature);
    }

    let ts: i64 = timestamp.parse().map_err(|_| WebhookError::InvalidSignature)?;
    if (now - ts).abs() > tolerance_secs {
        warn!(timestamp = ts, now, "Webhook timestamp outside tolerance");
        return Err(WebhookError::StaleTimestamp);
    }

    Ok(())
}

/// Handle successful checkout session
async fn handle_checkout_completed(
    state: &AppState,
    session: &CheckoutSessionData,
) -> Result<(), WebhookError> {
    info!(session_id = %session.id, "Processing checkout completion");

    let user_id = session.user_id().ok_or_else(|| {
        error!(session_id = %session.id, "Missing user_id in session metadata and client_reference_id");
        WebhookError::InvalidMetadata
    })?;

    let package = session.package();

    state
        .profile_store
        .record_purchase(user_id, package)
        .await
        .map_err(WebhookError::Database)?;

    info!(
        user_id = %user_id,
        package = %package,
        session_id = %session.id,
        "Package unlocked"
    );

    Ok(())
}

// ============================================================================
// Replay guard
// ============================================================================

/// In-process record of processed event ids
#[derive(Default)]
pub struct EventLedger {
    processed: DashMap<String, i64>,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, event_id: &str) -> bool {
        self.processed.contains_key(event_id)
    }

    pub fn record(&self, event_id: &str, now: i64) {
        self.processed.insert(event_id.to_string(), now);
    }

    /// Forget events older than the retention window
    pub fn prune(&self, now: i64) {
        self.processed
            .retain(|_, processed_at| now - *processed_at < LEDGER_RETENTION_SECS);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.processed.len()
    }
}

// ============================================================================
// Stripe Event Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct StripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionData {
    id: String,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

impl CheckoutSessionData {
    fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key).map(String::as_str)
    }

    /// `metadata.user_id`, falling back to `client_reference_id`
    fn user_id(&self) -> Option<Uuid> {
        self.metadata("user_id")
            .and_then(|s| s.parse().ok())
            .or_else(|| self.client_reference_id.as_deref()?.parse().ok())
    }

    fn package(&self) -> Package {
        match self.metadata("package_type").map(str::parse::<Package>) {
            Some(Ok(package)) => package,
            other => {
                warn!(session_id = %self.id, package = ?other, "No valid package_type in metadata, defaulting to vault");
                Package::Vault
            }
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing stripe-signature header")]
    MissingSignature,

    #[error("Invalid request payload")]
    InvalidPayload,

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Webhook timestamp outside tolerance")]
    StaleTimestamp,

    #[error("No user id in checkout session")]
    InvalidMetadata,

    #[error("Database error: {0}")]
    Database(#[from] SupabaseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        let body = json!({ "error": format!("Webhook Error: {}", self) });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sign(payload: &str, secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn accepts_valid_signature() {
        let payload = r#"{"id":"evt_1"}"#;
        let header = sign(payload, SECRET, NOW);
        assert!(verify_stripe_signature(payload, &header, SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn accepts_any_matching_v1() {
        let payload = r#"{"id":"evt_1"}"#;
        let good = sign(payload, SECRET, NOW);
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", NOW, "00".repeat(32), good_sig);
        assert!(verify_stripe_signature(payload, &header, SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn rejects_tampered_payload_and_wrong_secret() {
        let header = sign(r#"{"id":"evt_1"}"#, SECRET, NOW);
        assert!(matches!(
            verify_stripe_signature(r#"{"id":"evt_2"}"#, &header, SECRET, 300, NOW),
            Err(WebhookError::InvalidSignature)
        ));
        assert!(matches!(
            verify_stripe_signature(r#"{"id":"evt_1"}"#, &header, "whsec_other", 300, NOW),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_malformed_headers() {
        let payload = "{}";
        for header in ["", "t=1", "v1=abcd", "garbage", "t=abc,v1=zz"] {
            assert!(
                verify_stripe_signature(payload, header, SECRET, 300, NOW).is_err(),
                "header {header:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_stale_timestamp() {
        let payload = "{}";
        let header = sign(payload, SECRET, NOW - 301);
        assert!(matches!(
            verify_stripe_signature(payload, &header, SECRET, 300, NOW),
            Err(WebhookError::StaleTimestamp)
        ));
    }

    #[test]
    fn user_id_prefers_metadata_then_client_reference() {
        let meta_user = Uuid::new_v4();
        let ref_user = Uuid::new_v4();

        let session: CheckoutSessionData = serde_json::from_value(json!({
            "id": "cs_1",
            "client_reference_id": ref_user,
            "metadata": { "user_id": meta_user, "package_type": "sniper" }
        }))
        .unwrap();
        assert_eq!(session.user_id(), Some(meta_user));
        assert_eq!(session.package(), Package::Sniper);

        let session: CheckoutSessionData = serde_json::from_value(json!({
            "id": "cs_2",
            "client_reference_id": ref_user,
            "metadata": null
        }))
        .unwrap();
        assert_eq!(session.user_id(), Some(ref_user));
        assert_eq!(session.package(), Package::Vault);

        let session: CheckoutSessionData =
            serde_json::from_value(json!({ "id": "cs_3", "metadata": {} })).unwrap();
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn ledger_remembers_and_prunes() {
        let ledger = EventLedger::new();
        assert!(!ledger.seen("evt_1"));
        ledger.record("evt_1", NOW);
        assert!(ledger.seen("evt_1"));

        for i in 0..100 {
            ledger.record(&format!("evt_old_{i}"), NOW);
        }
        ledger.record("evt_new", NOW + LEDGER_RETENTION_SECS);

        // recording alone never sweeps
        assert_eq!(ledger.len(), 102);

        ledger.prune(NOW + LEDGER_RETENTION_SECS - 1);
        assert_eq!(ledger.len(), 102);

        ledger.prune(NOW + LEDGER_RETENTION_SECS);
        assert!(ledger.seen("evt_new"));
        assert!(!ledger.seen("evt_1"));
        assert_eq!(ledger.len(), 1);
    }
}
