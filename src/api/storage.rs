//! Storage API: object upload, removal, and public URL derivation

use anyhow::{Context, Result};
use reqwest::Method;

use super::SupabaseClient;

/// Percent-encode each path segment while keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl SupabaseClient {
    /// Delete one object. Missing objects are not an error here; callers that
    /// treat removal as best-effort check the result themselves.
    pub async fn remove_object(&self, bucket: &str, path: &str) -> Result<()> {
        let url = format!("/storage/v1/object/{}/{}", bucket, encode_path(path));
        let response = self
            .request(Method::DELETE, &url)
            .send()
            .await
            .with_context(|| format!("Failed to remove {}/{}", bucket, path))?;
        Self::check(response, "Object removal").await?;
        Ok(())
    }

    /// Upload object bytes. Fails if an object already exists at the path;
    /// the importer deletes first, matching the delete-then-upload flow the
    /// storage API requires for replacement.
    pub async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let url = format!("/storage/v1/object/{}/{}", bucket, encode_path(path));
        let response = self
            .request(Method::POST, &url)
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}/{}", bucket, path))?;
        Self::check(response, "Object upload").await?;
        Ok(())
    }

    /// Public URL for an object in a public bucket.
    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url(),
            bucket,
            path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_is_deterministic() {
        let client = SupabaseClient::new("https://proj.supabase.co", "key").unwrap();
        let id = "4f5c1f5e-8d2a-4b54-9a34-1c2f0b6f3b11";
        assert_eq!(
            client.public_object_url("avatars", &format!("{}/profile.jpg", id)),
            format!(
                "https://proj.supabase.co/storage/v1/object/public/avatars/{}/profile.jpg",
                id
            )
        );
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("abc/profile.jpg"), "abc/profile.jpg");
        assert_eq!(encode_path("a b/x y.jpg"), "a%20b/x%20y.jpg");
    }
}
