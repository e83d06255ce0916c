use std::path::{Path, PathBuf};

use async_trait::async_trait;
use db_infra::{DbInfraError, Scope};

use crate::SchemaMigration;

/// Migration whose body is SQL text compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSql {
    name: &'static str,
    sql: &'static str,
}

impl EmbeddedSql {
    pub const fn new(name: &'static str, sql: &'static str) -> Self {
        Self { name, sql }
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }
}

#[async_trait]
impl SchemaMigration for EmbeddedSql {
    fn name(&self) -> &str {
        self.name
    }

    async fn up(&self, scope: &Scope) -> Result<(), DbInfraError> {
        scope.execute_batch(self.sql).await
    }
}

/// Migration loaded from a `.sql` file at apply time.
///
/// The file is read as UTF-8 and executed verbatim as one batch.
#[derive(Debug, Clone)]
pub struct SqlFileMigration {
    name: String,
    path: PathBuf,
}

impl SqlFileMigration {
    /// Names the migration after the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    pub fn named(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_body(&self) -> Result<String, DbInfraError> {
        let sql = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DbInfraError::config(format!(
                "failed to read migration file {}: {e}",
                self.path.display()
            ))
        })?;
        if sql.trim().is_empty() {
            return Err(DbInfraError::config(format!(
                "migration file {} is empty",
                self.path.display()
            )));
        }
        Ok(sql)
    }
}

#[async_trait]
impl SchemaMigration for SqlFileMigration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn up(&self, scope: &Scope) -> Result<(), DbInfraError> {
        let sql = self.read_body().await?;
        scope.execute_batch(&sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_migration_named_after_stem() {
        let migration = SqlFileMigration::new("/srv/migrations/add_bin_locations.sql");
        assert_eq!(migration.name(), "add_bin_locations");
        assert_eq!(
            migration.path(),
            Path::new("/srv/migrations/add_bin_locations.sql")
        );
    }

    #[test]
    fn test_explicit_name_wins() {
        let migration = SqlFileMigration::named("hotfix", "/tmp/x.sql");
        assert_eq!(migration.name(), "hotfix");
    }
}
