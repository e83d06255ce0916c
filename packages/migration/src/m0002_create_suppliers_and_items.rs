use async_trait::async_trait;
use db_infra::{DbInfraError, Scope};
use sea_orm_migration::prelude::*;

use crate::{apply, SchemaMigration};

pub struct Migration;

#[derive(DeriveIden)]
pub(crate) enum Suppliers {
    Table,
    Id,
    Name,
    ContactEmail,
    Phone,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Items {
    Table,
    Id,
    Sku,
    Name,
    Unit,
    SupplierId,
    QuantityOnHand,
    CreatedAt,
    UpdatedAt,
}

#[async_trait]
impl SchemaMigration for Migration {
    fn name(&self) -> &str {
        "m0002_create_suppliers_and_items"
    }

    async fn up(&self, scope: &Scope) -> Result<(), DbInfraError> {
        let suppliers = Table::create()
            .table(Suppliers::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Suppliers::Id)
                    .big_integer()
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .col(
                ColumnDef::new(Suppliers::Name)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Suppliers::ContactEmail).string().null())
            .col(ColumnDef::new(Suppliers::Phone).string().null())
            .col(
                ColumnDef::new(Suppliers::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .to_owned();
        apply(scope, &suppliers).await?;

        // Items may exist before a supplier is known; deleting a supplier
        // orphans its items rather than removing stock records.
        let items = Table::create()
            .table(Items::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Items::Id)
                    .big_integer()
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .col(ColumnDef::new(Items::Sku).string().not_null().unique_key())
            .col(ColumnDef::new(Items::Name).string().not_null())
            .col(
                ColumnDef::new(Items::Unit)
                    .string()
                    .not_null()
                    .default("each"),
            )
            .col(ColumnDef::new(Items::SupplierId).big_integer().null())
            .col(
                ColumnDef::new(Items::QuantityOnHand)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(
                ColumnDef::new(Items::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .col(
                ColumnDef::new(Items::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_items_supplier")
                    .from(Items::Table, Items::SupplierId)
                    .to(Suppliers::Table, Suppliers::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        apply(scope, &items).await
    }
}
