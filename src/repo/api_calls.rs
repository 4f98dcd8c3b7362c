use chrono::{DateTime, Utc};
use crate::repository;

repository!(ApiCalls,
    /// Counts one more upstream call in the calendar month of `now` and
    /// returns the updated count.
    pub async fn increment(&self, now: DateTime<Utc>) -> anyhow::Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "INSERT INTO Api_Calls (month, count) VALUES (?, 1)
                ON CONFLICT (month) DO UPDATE SET count = count + 1
                RETURNING count")
            .bind(month_key(now))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.try_into()?)
    }
,
    pub async fn get(&self, now: DateTime<Utc>) -> anyhow::Result<u32> {
        let count: Option<i64> = sqlx::query_scalar("SELECT count FROM Api_Calls WHERE month = ?")
            .bind(month_key(now))
            .fetch_optional(&self.pool)
            .await?;
        Ok(count.unwrap_or(0).try_into()?)
    }
);

fn month_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}
