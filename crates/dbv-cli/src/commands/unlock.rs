//! Unlock command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, UnlockArgs};
use crate::commands::common::load_project;

/// Execute the unlock command
pub async fn execute(_args: &UnlockArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database()?;
    let migrator = project.migrator(db);

    if !migrator.status().await?.running {
        println!("Database is not locked");
        return Ok(());
    }

    log::warn!(
        "Clearing migration lock on {}; make sure no other run is still active",
        project.config.table_name
    );
    migrator.force_unlock().await?;
    println!("Lock cleared");
    Ok(())
}
