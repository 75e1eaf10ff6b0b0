//! Backend connection settings from the environment

use anyhow::{Context, Result};

/// Connection settings for the target Supabase project.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub service_role_key: String,
}

impl Config {
    /// Load from the environment, reading a `.env` file first if present.
    /// Both variables are required; anon keys lack the admin privileges the
    /// importer needs.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url =
            std::env::var("SUPABASE_URL").context("SUPABASE_URL is not set")?;
        let service_role_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .context("SUPABASE_SERVICE_ROLE_KEY is not set")?;

        Ok(Self {
            base_url,
            service_role_key,
        })
    }
}
