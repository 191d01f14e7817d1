//! Migrate command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::load_project;

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database()?;
    let migrator = project.migrator(db);

    if args.dry_run {
        let pending = migrator.pending().await?;
        if pending.is_empty() {
            println!("No pending migrations in {}", project.migrations_dir().display());
        } else {
            println!("Would apply {} migration(s):", pending.len());
            for version in pending {
                println!("  #{}", version);
            }
        }
        return Ok(());
    }

    let report = migrator.migrate().await?;
    if report.is_up_to_date() {
        println!("Database is up to date at version {}", report.to_version);
    } else {
        println!(
            "Migrated from version {} to {} ({} applied)",
            report.from_version,
            report.to_version,
            report.applied.len()
        );
    }
    Ok(())
}
