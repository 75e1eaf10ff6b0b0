//! GoTrue admin API: list, create, and update auth identities

use anyhow::{Context, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::SupabaseClient;

/// Page size for the bulk user listing. One page covers a department roster
/// with plenty of headroom; the loop below still follows further pages.
const LIST_PAGE_SIZE: usize = 1000;

/// An auth identity as returned by the admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

#[derive(Debug, Deserialize)]
struct UserPage {
    users: Vec<AdminUser>,
}

impl SupabaseClient {
    /// Fetch all auth users, following pages until one comes back short.
    pub async fn list_users(&self) -> Result<Vec<AdminUser>> {
        let mut users = Vec::new();
        let mut page = 1;
        loop {
            let response = self
                .request(Method::GET, "/auth/v1/admin/users")
                .query(&[("page", page.to_string()), ("per_page", LIST_PAGE_SIZE.to_string())])
                .send()
                .await
                .context("Failed to list auth users")?;
            let page_body: UserPage = Self::check(response, "Auth user listing")
                .await?
                .json()
                .await
                .context("Failed to decode auth user listing")?;

            let fetched = page_body.users.len();
            users.extend(page_body.users);
            if fetched < LIST_PAGE_SIZE {
                break;
            }
            page += 1;
        }
        log::debug!("fetched {} auth users", users.len());
        Ok(users)
    }

    /// Create a confirmed identity with the display name in its metadata.
    pub async fn create_user(&self, email: &str, full_name: &str) -> Result<AdminUser> {
        let response = self
            .request(Method::POST, "/auth/v1/admin/users")
            .json(&json!({
                "email": email,
                "email_confirm": true,
                "user_metadata": { "full_name": full_name },
            }))
            .send()
            .await
            .with_context(|| format!("Failed to create auth user {}", email))?;
        Self::check(response, "Auth user creation")
            .await?
            .json()
            .await
            .context("Failed to decode created auth user")
    }

    /// Overwrite an identity's `full_name` metadata in place.
    pub async fn update_user_name(&self, id: Uuid, full_name: &str) -> Result<()> {
        let response = self
            .request(Method::PUT, &format!("/auth/v1/admin/users/{}", id))
            .json(&json!({
                "user_metadata": { "full_name": full_name },
            }))
            .send()
            .await
            .with_context(|| format!("Failed to update auth user {}", id))?;
        Self::check(response, "Auth user update").await?;
        Ok(())
    }
}
