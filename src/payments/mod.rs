//! Package sales through Stripe Checkout

pub mod package;
pub mod stripe;
pub mod webhook;

pub use package::{Entitlement, Feature, Package};
pub use stripe::StripeService;
pub use webhook::EventLedger;
