use async_trait::async_trait;
use db_infra::{DbInfraError, Scope};
use sea_orm_migration::prelude::*;

use crate::m0001_create_users::Users;
use crate::{apply, SchemaMigration};

pub struct Migration;

#[derive(DeriveIden)]
enum ImportBatches {
    Table,
    Id,
    SourceFile,
    Status,
    RowsTotal,
    RowsImported,
    ErrorMessage,
    ImportedBy,
    StartedAt,
    FinishedAt,
}

#[async_trait]
impl SchemaMigration for Migration {
    fn name(&self) -> &str {
        "m0005_create_import_batches"
    }

    async fn up(&self, scope: &Scope) -> Result<(), DbInfraError> {
        let batches = Table::create()
            .table(ImportBatches::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(ImportBatches::Id)
                    .big_integer()
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .col(ColumnDef::new(ImportBatches::SourceFile).string().not_null())
            .col(
                ColumnDef::new(ImportBatches::Status)
                    .string()
                    .not_null()
                    .default("pending"),
            )
            .col(
                ColumnDef::new(ImportBatches::RowsTotal)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(ImportBatches::RowsImported)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .col(ColumnDef::new(ImportBatches::ErrorMessage).text().null())
            .col(ColumnDef::new(ImportBatches::ImportedBy).big_integer().null())
            .col(
                ColumnDef::new(ImportBatches::StartedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .col(
                ColumnDef::new(ImportBatches::FinishedAt)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_import_batches_imported_by")
                    .from(ImportBatches::Table, ImportBatches::ImportedBy)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        apply(scope, &batches).await
    }
}
