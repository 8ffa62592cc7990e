//! Stripe checkout session creation

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::package::Package;
use crate::config::Config;

const STRIPE_CHECKOUT_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

/// Stripe service for payment operations
#[derive(Clone)]
pub struct StripeService {
    client: Client,
    stripe_secret_key: String,
    site_url: String,
}

impl StripeService {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            stripe_secret_key: config.stripe_secret_key.clone(),
            site_url: config.site_url.clone(),
        }
    }

    /// Create a hosted checkout session for a package
    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        package: Package,
    ) -> Result<CheckoutSessionResponse, StripeError> {
        let form_data = checkout_form(user_id, package, &self.site_url);

        // Call Stripe API
        let response = self
            .client
            .post(STRIPE_CHECKOUT_URL)
            .basic_auth(&self.stripe_secret_key, None::<&str>)
            .form(&form_data)
            .send()
            .await
            .map_err(StripeError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::Api { status: status.as_u16(), body });
        }

        let session: StripeSession = response.json().await.map_err(StripeError::Request)?;
        let url = session.url.ok_or(StripeError::NoSessionUrl)?;

        info!(
            user_id = %user_id,
            package = %package,
            session_id = %session.id,
            "Checkout session created"
        );

        Ok(CheckoutSessionResponse {
            session_id: session.id,
            url,
        })
    }
}

/// Form body for `POST /v1/checkout/sessions`
fn checkout_form(user_id: Uuid, package: Package, site_url: &str) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        (
            "success_url",
            format!(
                "{}/dashboard?success=true&session_id={{CHECKOUT_SESSION_ID}}",
                site_url
            ),
        ),
        ("cancel_url", format!("{}/pricing?canceled=true", site_url)),
        ("client_reference_id", user_id.to_string()),
        ("metadata[user_id]", user_id.to_string()),
        ("metadata[package_type]", package.as_str().to_string()),
        ("line_items[0][price_data][currency]", "usd".to_string()),
        (
            "line_items[0][price_data][unit_amount]",
            package.price_cents().to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            package.display_name().to_string(),
        ),
        (
            "line_items[0][price_data][product_data][description]",
            package.description().to_string(),
        ),
        ("line_items[0][quantity]", "1".to_string()),
    ]
}

/// Stripe checkout session response
#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
}

/// Response from checkout session creation
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
}

/// Stripe-related errors
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Stripe API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("No session URL returned")]
    NoSessionUrl,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(form: &'a [(&'static str, String)], key: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing form field {key}"))
    }

    #[test]
    fn form_carries_user_and_package() {
        let user_id = Uuid::new_v4();
        let form = checkout_form(user_id, Package::Sniper, "https://octane.example");

        assert_eq!(field(&form, "mode"), "payment");
        assert_eq!(field(&form, "client_reference_id"), user_id.to_string());
        assert_eq!(field(&form, "metadata[user_id]"), user_id.to_string());
        assert_eq!(field(&form, "metadata[package_type]"), "sniper");
        assert_eq!(field(&form, "line_items[0][price_data][unit_amount]"), "2700");
        assert_eq!(
            field(&form, "line_items[0][price_data][product_data][name]"),
            "Identity Sniper"
        );
    }

    #[test]
    fn redirect_urls_keep_stripe_placeholder() {
        let form = checkout_form(Uuid::new_v4(), Package::Vault, "https://octane.example");
        assert_eq!(
            field(&form, "success_url"),
            "https://octane.example/dashboard?success=true&session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            field(&form, "cancel_url"),
            "https://octane.example/pricing?canceled=true"
        );
    }
}
