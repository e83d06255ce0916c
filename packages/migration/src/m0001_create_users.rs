use async_trait::async_trait;
use db_infra::{DbInfraError, Scope};
use sea_orm_migration::prelude::*;

use crate::{apply, SchemaMigration};

pub struct Migration;

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    DisplayName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[async_trait]
impl SchemaMigration for Migration {
    fn name(&self) -> &str {
        "m0001_create_users"
    }

    async fn up(&self, scope: &Scope) -> Result<(), DbInfraError> {
        let users = Table::create()
            .table(Users::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Users::Id)
                    .big_integer()
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .col(
                ColumnDef::new(Users::Username)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Users::PasswordHash).string().not_null())
            .col(ColumnDef::new(Users::DisplayName).string().null())
            .col(
                ColumnDef::new(Users::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .col(
                ColumnDef::new(Users::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .col(
                ColumnDef::new(Users::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .to_owned();

        apply(scope, &users).await
    }
}
