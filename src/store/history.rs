//! Posting history backing the streak tracker

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{SupabaseClient, SupabaseError};

const HISTORY_TABLE: &str = "user_content_history";

/// Supabase's default `max-rows`
const PAGE_SIZE: usize = 1000;

/// Row of the `user_content_history` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_id: Uuid,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
struct NewHistoryEntry<'a> {
    user_id: Uuid,
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedAt {
    created_at: DateTime<Utc>,
}

/// History store operations
#[derive(Clone)]
pub struct HistoryStore {
    client: SupabaseClient,
}

impl HistoryStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Record that the user posted a piece of content
    pub async fn record_post(
        &self,
        user_id: Uuid,
        content_type: &str,
    ) -> Result<HistoryEntry, SupabaseError> {
        self.client
            .insert(
                HISTORY_TABLE,
                &NewHistoryEntry { user_id, content_type },
            )
            .await
    }

    /// Every posting timestamp at or after `since`, oldest first
    pub async fn post_times(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, SupabaseError> {
        let mut times = Vec::new();

        loop {
            let query = post_times_query(user_id, since, times.len());
            let rows: Vec<CreatedAt> = self.client.get(HISTORY_TABLE, &query).await?;
            let fetched = rows.len();
            times.extend(rows.into_iter().map(|r| r.created_at));

            if fetched < PAGE_SIZE {
                return Ok(times);
            }
        }
    }
}

/// One page of timestamps bounded by date, not row count
fn post_times_query(user_id: Uuid, since: DateTime<Utc>, offset: usize) -> String {
    format!(
        "user_id=eq.{}&created_at=gte.{}&select=created_at&order=created_at.asc&limit={}&offset={}",
        user_id,
        since.to_rfc3339_opts(SecondsFormat::Secs, true),
        PAGE_SIZE,
        offset
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_bounded_by_date() {
        let user = Uuid::new_v4();
        let since: DateTime<Utc> = "2024-01-05T00:00:00Z".parse().unwrap();

        let query = post_times_query(user, since, 2 * PAGE_SIZE);
        assert!(query.starts_with(&format!("user_id=eq.{}&", user)));
        assert!(query.contains("&created_at=gte.2024-01-05T00:00:00Z&"));
        assert!(query.contains(&format!("&limit={}&offset={}", PAGE_SIZE, 2 * PAGE_SIZE)));
        assert!(!query.contains('+'));
    }
}
