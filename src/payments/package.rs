//! Package catalog and feature entitlements

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed-price packages sold through Stripe checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Package {
    /// Identity Sniper
    Sniper,
    /// Authority Vault
    Vault,
}

impl Package {
    pub fn as_str(&self) -> &'static str {
        match self {
            Package::Sniper => "sniper",
            Package::Vault => "vault",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Package::Sniper => "Identity Sniper",
            Package::Vault => "Authority Vault",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Package::Sniper => "AI bios, captions, hashtags and idea scoring for your creator identity",
            Package::Vault => "Everything in Identity Sniper plus video blueprints, hooks and content ideas",
        }
    }

    /// One-time price in USD cents
    pub fn price_cents(&self) -> i64 {
        match self {
            Package::Sniper => 2_700,
            Package::Vault => 9_700,
        }
    }

    /// Features unlocked by this package
    pub fn features(&self) -> &'static [Feature] {
        match self {
            Package::Sniper => &[
                Feature::IdeaAnalysis,
                Feature::Bios,
                Feature::Hashtags,
                Feature::Captions,
            ],
            Package::Vault => &Feature::ALL,
        }
    }

    pub fn unlocks(&self, feature: Feature) -> bool {
        self.features().contains(&feature)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Package {
    type Err = UnknownPackage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sniper" => Ok(Package::Sniper),
            "vault" => Ok(Package::Vault),
            other => Err(UnknownPackage(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid package type: {0}")]
pub struct UnknownPackage(pub String);

/// Dashboard features gated behind a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    IdeaAnalysis,
    Bios,
    Hashtags,
    Captions,
    Blueprints,
    Hooks,
    ContentIdeas,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::IdeaAnalysis,
        Feature::Bios,
        Feature::Hashtags,
        Feature::Captions,
        Feature::Blueprints,
        Feature::Hooks,
        Feature::ContentIdeas,
    ];
}

/// What a user is allowed to use, derived from their profile row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entitlement {
    None,
    Purchased { package: Package, founder: bool },
}

impl Entitlement {
    pub fn package(&self) -> Option<Package> {
        match self {
            Entitlement::None => None,
            Entitlement::Purchased { package, .. } => Some(*package),
        }
    }

    pub fn is_founder(&self) -> bool {
        matches!(self, Entitlement::Purchased { founder: true, .. })
    }

    pub fn allows(&self, feature: Feature) -> bool {
        self.package().is_some_and(|p| p.unlocks(feature))
    }

    pub fn features(&self) -> Vec<Feature> {
        self.package()
            .map(|p| p.features().to_vec())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_known_packages() {
        assert_eq!("sniper".parse::<Package>().unwrap(), Package::Sniper);
        assert_eq!("vault".parse::<Package>().unwrap(), Package::Vault);
        assert!("Vault".parse::<Package>().is_err());
        assert!("".parse::<Package>().is_err());
    }

    #[test]
    fn sniper_does_not_unlock_vault_features() {
        let sniper = Entitlement::Purchased { package: Package::Sniper, founder: true };
        assert!(sniper.allows(Feature::Bios));
        assert!(sniper.allows(Feature::Hashtags));
        assert!(!sniper.allows(Feature::Blueprints));
        assert!(!sniper.allows(Feature::Hooks));
    }

    #[test]
    fn vault_unlocks_everything() {
        let vault = Entitlement::Purchased { package: Package::Vault, founder: false };
        for feature in Feature::ALL {
            assert!(vault.allows(feature), "{feature:?} should be unlocked");
        }
        assert!(!vault.is_founder());
    }

    #[test]
    fn no_purchase_unlocks_nothing() {
        assert!(Feature::ALL.iter().all(|f| !Entitlement::None.allows(*f)));
        assert!(Entitlement::None.features().is_empty());
    }
}
