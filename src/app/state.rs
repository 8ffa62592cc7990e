//! Application state shared across routes

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::content::{ContentService, GeminiClient, TextGenerator};
use crate::payments::{EventLedger, StripeService};
use crate::store::{EntitlementLookup, HistoryStore, ProfileStore, SupabaseClient};
use crate::util::rate_limit::{create_user_limiter, UserLimiter};

/// How often idle limiter keys and expired webhook ids are swept
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profile_store: ProfileStore,
    pub entitlements: Arc<dyn EntitlementLookup>,
    pub history_store: HistoryStore,
    pub stripe: StripeService,
    pub content: ContentService,
    pub webhook_ledger: Arc<EventLedger>,
    pub generation_limiter: Arc<UserLimiter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let generator = Arc::new(GeminiClient::new(&config));
        Self::with_generator(config, generator)
    }

    /// Build state around a specific text generator
    pub fn with_generator(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let config = Arc::new(config);

        // Initialize Supabase client and stores
        let supabase = SupabaseClient::new(&config);
        let profile_store = ProfileStore::new(supabase.clone());
        let history_store = HistoryStore::new(supabase);

        Self {
            stripe: StripeService::new(&config),
            content: ContentService::new(generator),
            webhook_ledger: Arc::new(EventLedger::new()),
            generation_limiter: create_user_limiter(config.generation_rate_limit),
            entitlements: Arc::new(profile_store.clone()),
            profile_store,
            history_store,
            config,
        }
    }

    /// Swap the source used to resolve what a user has purchased
    pub fn with_entitlements(mut self, entitlements: Arc<dyn EntitlementLookup>) -> Self {
        self.entitlements = entitlements;
        self
    }

    /// Drop limiter state for idle users and forget expired webhook events
    pub fn sweep(&self, now: i64) {
        self.generation_limiter.retain_recent();
        self.generation_limiter.shrink_to_fit();
        self.webhook_ledger.prune(now);
        debug!(
            limiter_keys = self.generation_limiter.len(),
            "Housekeeping sweep complete"
        );
    }

    /// Run `sweep` periodically
    pub async fn run_housekeeping(self) {
        let mut interval = tokio::time::interval(HOUSEKEEPING_INTERVAL);

        loop {
            interval.tick().await;
            self.sweep(chrono::Utc::now().timestamp());
        }
    }
}
