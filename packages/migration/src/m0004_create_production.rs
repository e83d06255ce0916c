use async_trait::async_trait;
use db_infra::{DbInfraError, Scope};
use sea_orm_migration::prelude::*;

use crate::m0001_create_users::Users;
use crate::m0002_create_suppliers_and_items::Items;
use crate::{apply, SchemaMigration};

pub struct Migration;

/// A batch of finished goods; `item_id` is the item produced.
#[derive(DeriveIden)]
enum ProductionLots {
    Table,
    Id,
    LotNumber,
    ItemId,
    QuantityProduced,
    ProducedBy,
    ProducedAt,
}

/// Stock consumed by a lot.
#[derive(DeriveIden)]
enum LotComponents {
    Table,
    Id,
    LotId,
    ItemId,
    Quantity,
}

#[async_trait]
impl SchemaMigration for Migration {
    fn name(&self) -> &str {
        "m0004_create_production"
    }

    async fn up(&self, scope: &Scope) -> Result<(), DbInfraError> {
        let lots = Table::create()
            .table(ProductionLots::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(ProductionLots::Id)
                    .big_integer()
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .col(
                ColumnDef::new(ProductionLots::LotNumber)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(ProductionLots::ItemId).big_integer().not_null())
            .col(
                ColumnDef::new(ProductionLots::QuantityProduced)
                    .double()
                    .not_null()
                    .default(0.0),
            )
            .col(ColumnDef::new(ProductionLots::ProducedBy).big_integer().null())
            .col(
                ColumnDef::new(ProductionLots::ProducedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_production_lots_item")
                    .from(ProductionLots::Table, ProductionLots::ItemId)
                    .to(Items::Table, Items::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_production_lots_produced_by")
                    .from(ProductionLots::Table, ProductionLots::ProducedBy)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        apply(scope, &lots).await?;

        let components = Table::create()
            .table(LotComponents::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(LotComponents::Id)
                    .big_integer()
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .col(ColumnDef::new(LotComponents::LotId).big_integer().not_null())
            .col(ColumnDef::new(LotComponents::ItemId).big_integer().not_null())
            .col(ColumnDef::new(LotComponents::Quantity).double().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_lot_components_lot")
                    .from(LotComponents::Table, LotComponents::LotId)
                    .to(ProductionLots::Table, ProductionLots::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_lot_components_item")
                    .from(LotComponents::Table, LotComponents::ItemId)
                    .to(Items::Table, Items::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        apply(scope, &components).await
    }
}
