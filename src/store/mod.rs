//! Data store modules for Supabase integration

pub mod history;
pub mod profiles;
pub mod supabase;

pub use history::HistoryStore;
pub use profiles::{EntitlementLookup, ProfileStore};
pub use supabase::SupabaseClient;
