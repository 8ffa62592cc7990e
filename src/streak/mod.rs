//! Posting streak computation over calendar days (UTC)

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Streak summary returned to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    /// Consecutive days ending today, or yesterday if today is still open
    pub current: u32,
    /// Longest run of consecutive days in the history
    pub longest: u32,
    pub posted_today: bool,
    pub last_post: Option<NaiveDate>,
}

/// Midnight UTC `days` before `today`; history older than this is not read
pub fn window_start(today: NaiveDate, days: i64) -> DateTime<Utc> {
    (today - Duration::days(days)).and_time(NaiveTime::MIN).and_utc()
}

/// Compute the streak from posting timestamps in any order
pub fn streak_from_times(times: &[DateTime<Utc>], today: NaiveDate) -> Streak {
    compute_streak(times.iter().map(|t| t.date_naive()), today)
}

/// Compute the streak from posting dates; duplicates count once and
/// dates after `today` are ignored.
pub fn compute_streak<I>(dates: I, today: NaiveDate) -> Streak
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = dates.into_iter().filter(|d| *d <= today).collect();

    let Some(&last_post) = days.iter().next_back() else {
        return Streak::default();
    };

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for &day in &days {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    // `run` now holds the length of the run ending at `last_post`
    let posted_today = last_post == today;
    let alive = posted_today || today - last_post == Duration::days(1);

    Streak {
        current: if alive { run } else { 0 },
        longest,
        posted_today,
        last_post: Some(last_post),
    }
}
