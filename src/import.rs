//! Row-by-row import pipeline
//!
//! One pass over the roster, strictly sequential: resolve the auth identity,
//! replace the profile photo if the row has one, upsert the staff record,
//! rebuild and upsert the timetable. Every write is an upsert keyed on a
//! stable identifier, so rerunning after a failure converges.

use std::collections::HashMap;

use anyhow::{Context, Result};
use colored::*;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{AdminUser, SupabaseClient};
use crate::excel::{Roster, RowImage};
use crate::schedule::Week;

/// Placeholder some spreadsheet exports leave in blank email cells.
const EMAIL_PLACEHOLDER: &str = "nan";

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub processed: usize,
    pub skipped: usize,
    pub identities_created: usize,
    pub identities_updated: usize,
    pub photos_uploaded: usize,
}

/// A trimmed email, or `None` for blank cells and the `nan` placeholder.
fn importable_email(raw: &str) -> Option<&str> {
    let email = raw.trim();
    if email.is_empty() || email.eq_ignore_ascii_case(EMAIL_PLACEHOLDER) {
        return None;
    }
    Some(email)
}

/// Storage path for an identity's photo. One photo per identity, replaced in
/// place on each import.
fn photo_path(user_id: Uuid) -> String {
    format!("{}/profile.jpg", user_id)
}

/// Staff row payload. The `photo_url` key only exists when a photo was
/// uploaded for this row; rows without one leave any earlier URL untouched.
fn staff_payload(user_id: Uuid, dept: &str, photo_url: Option<String>) -> Value {
    let mut payload = json!({
        "profile_id": user_id,
        "dept": dept,
    });
    if let Some(url) = photo_url {
        payload["photo_url"] = Value::String(url);
    }
    payload
}

pub struct Importer<'a> {
    client: &'a SupabaseClient,
    bucket: &'a str,
    dept: &'a str,
    /// Email-keyed index of every auth user, fetched once upfront so the row
    /// loop never has to search the admin API.
    users: HashMap<String, AdminUser>,
}

impl<'a> Importer<'a> {
    /// Build an importer, pre-fetching the auth user index.
    pub async fn new(client: &'a SupabaseClient, bucket: &'a str, dept: &'a str) -> Result<Self> {
        println!("{}", "Loading auth users...".dimmed());
        let users = client
            .list_users()
            .await?
            .into_iter()
            .filter_map(|u| u.email.clone().map(|email| (email, u)))
            .collect::<HashMap<_, _>>();
        println!("{} {} existing auth users", "Indexed".dimmed(), users.len());

        Ok(Self {
            client,
            bucket,
            dept,
            users,
        })
    }

    /// Run the import over every roster row.
    pub async fn run(&mut self, roster: &Roster, images: &HashMap<u32, RowImage>) -> Result<ImportStats> {
        let mut stats = ImportStats::default();

        for (index, row) in roster.rows().iter().enumerate() {
            let worksheet_row = roster.worksheet_row(index);
            let email = roster.value(row, "Mail id").and_then(importable_email);
            let Some(email) = email else {
                log::debug!("row {}: no usable email, skipping", worksheet_row);
                stats.skipped += 1;
                continue;
            };
            let name = roster.value(row, "Staff Name").unwrap_or_default();

            println!("\n{} {}", "Processing".bold(), email.cyan());
            self.import_row(roster, row, worksheet_row, email, name, images, &mut stats)
                .await
                .with_context(|| format!("Row {} ({})", worksheet_row, email))?;
            stats.processed += 1;
        }

        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    async fn import_row(
        &mut self,
        roster: &Roster,
        row: &[String],
        worksheet_row: u32,
        email: &str,
        name: &str,
        images: &HashMap<u32, RowImage>,
        stats: &mut ImportStats,
    ) -> Result<()> {
        let user_id = self.resolve_identity(email, name, stats).await?;

        let photo_url = match images.get(&worksheet_row) {
            Some(image) => {
                let url = self.replace_photo(user_id, image).await?;
                stats.photos_uploaded += 1;
                println!("  {}", "photo uploaded".green());
                Some(url)
            }
            None => None,
        };

        let staff = staff_payload(user_id, self.dept, photo_url);
        self.client.upsert("staff", "profile_id", &staff).await?;

        // The upsert answers with no body, so fetch the row back for its
        // internal id before touching the timetable.
        let staff_row = self
            .client
            .select_single("staff", "id", "profile_id", &user_id.to_string())
            .await
            .context("Staff row missing after upsert")?;
        let staff_id = &staff_row["id"];
        println!("  {}", "staff upserted".green());

        let week = Week::from_columns(roster.columns(row));
        let mut timetable = serde_json::to_value(&week).context("Failed to serialize week")?;
        timetable["staff_id"] = staff_id.clone();
        self.client.upsert("timetable", "staff_id", &timetable).await?;
        println!(
            "  {} ({} slots)",
            "timetable upserted".green(),
            week.populated()
        );

        Ok(())
    }

    /// Look the email up in the index; create the identity if absent, else
    /// refresh its display-name metadata.
    async fn resolve_identity(
        &mut self,
        email: &str,
        name: &str,
        stats: &mut ImportStats,
    ) -> Result<Uuid> {
        if let Some(user) = self.users.get(email) {
            let id = user.id;
            self.client.update_user_name(id, name).await?;
            stats.identities_updated += 1;
            println!("  {}", "auth user exists, metadata updated".yellow());
            return Ok(id);
        }

        let user = self.client.create_user(email, name).await?;
        let id = user.id;
        self.users.insert(email.to_string(), user);
        stats.identities_created += 1;
        println!("  {}", "auth user created".green());
        Ok(id)
    }

    /// Best-effort delete of the previous photo, then upload the new one.
    /// Removal fails on the first run for every identity; that is expected
    /// and ignored.
    async fn replace_photo(&self, user_id: Uuid, image: &RowImage) -> Result<String> {
        let path = photo_path(user_id);

        if let Err(e) = self.client.remove_object(self.bucket, &path).await {
            log::debug!("removing {}/{} failed (treated as absent): {:#}", self.bucket, path, e);
        }

        self.client
            .upload_object(self.bucket, &path, image.bytes.clone(), image.content_type)
            .await?;

        Ok(self.client.public_object_url(self.bucket, &path))
    }
}

/// Report what a run would do without calling the backend.
pub fn preview(roster: &Roster, images: &HashMap<u32, RowImage>) {
    let mut importable = 0;
    let mut skipped = 0;
    let mut with_photo = 0;

    for (index, row) in roster.rows().iter().enumerate() {
        let worksheet_row = roster.worksheet_row(index);
        let Some(email) = roster.value(row, "Mail id").and_then(importable_email) else {
            skipped += 1;
            continue;
        };
        importable += 1;
        let has_photo = images.contains_key(&worksheet_row);
        if has_photo {
            with_photo += 1;
        }
        let week = Week::from_columns(roster.columns(row));
        println!(
            "{} {} ({} slots{})",
            "would import".dimmed(),
            email.cyan(),
            week.populated(),
            if has_photo { ", photo" } else { "" }
        );
    }

    println!(
        "\n{} {} importable, {} skipped, {} with photos",
        "Dry run:".bold(),
        importable,
        skipped,
        with_photo
    );
}
