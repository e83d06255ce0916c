use db_infra::{ConnectionProvider, DbInfraError, OpsLogger};
use migration::{Catalog, MigrationReport, MigrationRunner, SqlFileMigration};
use tracing::info;

use crate::cli::{Command, MigrateAction};
use crate::usage::usage_report;

/// Executes `command` and returns what should be printed on stdout.
pub async fn run(
    command: &Command,
    provider: &ConnectionProvider,
    logger: &dyn OpsLogger,
) -> Result<String, DbInfraError> {
    match command {
        Command::Migrate { action } => migrate(action, provider, logger).await,
        Command::UsageReport { pretty } => {
            let report = usage_report(provider).await?;
            let rendered = if *pretty {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string(&report)
            };
            rendered.map_err(|e| {
                DbInfraError::query(format!("failed to render usage report: {e}"))
            })
        }
    }
}

async fn migrate(
    action: &MigrateAction,
    provider: &ConnectionProvider,
    logger: &dyn OpsLogger,
) -> Result<String, DbInfraError> {
    let catalog = Catalog::inventory();
    let runner = MigrationRunner::new(provider, logger);

    let reports = match action {
        MigrateAction::List => return Ok(catalog.names().join("\n")),
        MigrateAction::Up => runner.upgrade_all(&catalog).await?,
        MigrateAction::Apply { names } => {
            runner.upgrade_named(&catalog, names.as_slice()).await?
        }
        MigrateAction::File { paths } => {
            let mut reports = Vec::with_capacity(paths.len());
            for path in paths {
                reports.push(runner.upgrade(&SqlFileMigration::new(path)).await?);
            }
            reports
        }
    };

    info!(applied = reports.len(), "migrate=done");
    Ok(summarize(&reports))
}

fn summarize(reports: &[MigrationReport]) -> String {
    reports
        .iter()
        .map(|r| format!("✅ {} ({}ms)", r.name, r.elapsed.as_millis()))
        .collect::<Vec<_>>()
        .join("\n")
}
