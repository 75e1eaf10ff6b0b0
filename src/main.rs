//! Bulk-import a faculty roster workbook into a Supabase backend
//!
//! One-shot batch tool: creates or updates auth identities, uploads profile
//! photos embedded in the workbook, and upserts staff and timetable rows.
//! Safe to re-run; every write is keyed on a stable identifier.

mod api;
mod config;
mod excel;
mod import;
mod schedule;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::api::SupabaseClient;
use crate::config::Config;
use crate::import::Importer;

#[derive(Parser)]
#[command(name = "roster-import", about, version)]
struct Cli {
    /// Roster workbook to import
    #[arg(default_value = "cse.xlsx")]
    workbook: PathBuf,

    /// Storage bucket holding profile photos
    #[arg(long, default_value = "avatars")]
    bucket: String,

    /// Department code written to every staff record
    #[arg(long, default_value = "CSE")]
    dept: String,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Parse the workbook and report what would be written, without
    /// touching the backend
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("{} {}", "Reading".dimmed(), cli.workbook.display());
    let roster = excel::load_roster(&cli.workbook, cli.sheet.as_deref())?;
    let images = excel::extract_row_images(&cli.workbook, cli.sheet.as_deref())?;
    println!(
        "{} {} rows, {} embedded images",
        "Found".dimmed(),
        roster.rows().len(),
        images.len()
    );

    if cli.dry_run {
        import::preview(&roster, &images);
        return Ok(());
    }

    let config = Config::from_env()?;
    let client = SupabaseClient::new(config.base_url, config.service_role_key)?;

    let mut importer = Importer::new(&client, &cli.bucket, &cli.dept).await?;
    let stats = importer.run(&roster, &images).await?;

    println!(
        "\n{} {} rows imported ({} identities created, {} updated), {} photos, {} skipped",
        "Done:".bold().green(),
        stats.processed,
        stats.identities_created,
        stats.identities_updated,
        stats.photos_uploaded,
        stats.skipped
    );
    println!("{}", "Safe to re-run; all writes are upserts.".dimmed());

    Ok(())
}
