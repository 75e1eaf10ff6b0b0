//! Supabase HTTP client
//!
//! Thin wrappers over the three service surfaces the importer touches: the
//! GoTrue admin API (auth identities), the Storage API (profile photos), and
//! PostgREST (staff and timetable upserts).

pub mod auth;
pub mod client;
pub mod rest;
pub mod storage;

pub use auth::AdminUser;
pub use client::SupabaseClient;
