//! User profile and purchase flags

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::supabase::{SupabaseClient, SupabaseError};
use crate::payments::{Entitlement, Package};

/// Row of the `profiles` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(default)]
    pub has_purchased_package: bool,
    #[serde(default)]
    pub purchased_package_type: Option<String>,
    #[serde(default)]
    pub founder_license: bool,
}

impl UserProfile {
    /// Resolve the purchase columns into an entitlement.
    /// An unknown package type on a paid profile is logged and treated as unpaid.
    pub fn entitlement(&self) -> Entitlement {
        if !self.has_purchased_package {
            return Entitlement::None;
        }

        match self.purchased_package_type.as_deref().map(str::parse::<Package>) {
            Some(Ok(package)) => Entitlement::Purchased {
                package,
                founder: self.founder_license,
            },
            other => {
                warn!(user_id = %self.id, package = ?other, "Profile has purchase flag without a valid package");
                Entitlement::None
            }
        }
    }
}

/// Columns written when a checkout completes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PurchaseUpdate {
    pub id: Uuid,
    pub has_purchased_package: bool,
    pub purchased_package_type: String,
    pub founder_license: bool,
}

impl PurchaseUpdate {
    pub fn new(user_id: Uuid, package: Package) -> Self {
        Self {
            id: user_id,
            has_purchased_package: true,
            purchased_package_type: package.as_str().to_string(),
            founder_license: true,
        }
    }
}

/// Profile store operations
#[derive(Clone)]
pub struct ProfileStore {
    client: SupabaseClient,
}

impl ProfileStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Get a user profile by ID
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, SupabaseError> {
        let query = format!(
            "id=eq.{}&select=id,has_purchased_package,purchased_package_type,founder_license",
            user_id
        );
        self.client.get_one("profiles", &query).await
    }

    /// Flip the purchase columns, creating the profile row if needed
    pub async fn record_purchase(
        &self,
        user_id: Uuid,
        package: Package,
    ) -> Result<(), SupabaseError> {
        self.client
            .upsert("profiles", &PurchaseUpdate::new(user_id, package), "id")
            .await
    }
}

/// Resolves what a user has purchased
#[async_trait]
pub trait EntitlementLookup: Send + Sync {
    async fn entitlement(&self, user_id: Uuid) -> Result<Entitlement, SupabaseError>;
}

#[async_trait]
impl EntitlementLookup for ProfileStore {
    /// A missing profile has no purchase
    async fn entitlement(&self, user_id: Uuid) -> Result<Entitlement, SupabaseError> {
        Ok(self
            .get_profile(user_id)
            .await?
            .map(|p| p.entitlement())
            .unwrap_or(Entitlement::None))
    }
}
