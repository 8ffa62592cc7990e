//! Rate limiting utilities

use governor::{DefaultKeyedRateLimiter, Quota};
use std::num::NonZeroU32;
use std::sync::Arc;
use uuid::Uuid;

/// Per-user limiter for generation requests
pub type UserLimiter = DefaultKeyedRateLimiter<Uuid>;

/// Create a keyed limiter allowing `requests_per_minute` per user
pub fn create_user_limiter(requests_per_minute: u32) -> Arc<UserLimiter> {
    let quota =
        Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(UserLimiter::keyed(quota))
}

/// Check if a request is allowed for the user (returns true if allowed)
pub fn check_user(limiter: &UserLimiter, user_id: Uuid) -> bool {
    limiter.check_key(&user_id).is_ok()
}
