//! PostgREST table operations: conflict-keyed upsert and single-row select

use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::Value;

use super::SupabaseClient;

impl SupabaseClient {
    /// Insert-or-update one row, merging on the given conflict column.
    pub async fn upsert(&self, table: &str, on_conflict: &str, row: &Value) -> Result<()> {
        let response = self
            .request(Method::POST, &format!("/rest/v1/{}", table))
            .query(&[("on_conflict", on_conflict)])
            .header("prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await
            .with_context(|| format!("Failed to upsert into {}", table))?;
        Self::check(response, &format!("Upsert into {}", table)).await?;
        Ok(())
    }

    /// Select exactly one row matching `column = value`. Errors when zero or
    /// more than one row matches (PostgREST enforces this via the `Accept`
    /// header).
    pub async fn select_single(
        &self,
        table: &str,
        select: &str,
        column: &str,
        value: &str,
    ) -> Result<Value> {
        let filter = format!("eq.{}", value);
        let response = self
            .request(Method::GET, &format!("/rest/v1/{}", table))
            .query(&[("select", select), (column, filter.as_str())])
            .header("accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .with_context(|| format!("Failed to select from {}", table))?;
        Self::check(response, &format!("Select from {}", table))
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to decode row from {}", table))
    }
}
