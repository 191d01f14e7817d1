//! Status command implementation

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::load_project;

/// Version table snapshot printed by `dbv status`
#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub table: String,
    pub version: u32,
    pub locked: bool,
    pub pending: Vec<u32>,
    pub migrations_path: String,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = project.open_database()?;
    let migrator = project.migrator(db);

    let status = migrator.status().await?;
    let report = StatusReport {
        table: project.config.table_name.to_string(),
        version: status.version,
        locked: status.running,
        pending: migrator.pending().await?,
        migrations_path: project.migrations_dir().display().to_string(),
    };

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        StatusOutput::Text => print!("{}", render_text(&report)?),
    }
    Ok(())
}

fn render_text(report: &StatusReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Version table: {}", report.table)?;
    writeln!(out, "Current version: {}", report.version)?;
    writeln!(out, "Lock: {}", if report.locked { "held" } else { "free" })?;
    if report.pending.is_empty() {
        writeln!(out, "Pending: none ({})", report.migrations_path)?;
    } else {
        let versions: Vec<String> = report.pending.iter().map(|v| format!("#{v}")).collect();
        writeln!(
            out,
            "Pending: {} ({})",
            versions.join(", "),
            report.migrations_path
        )?;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
