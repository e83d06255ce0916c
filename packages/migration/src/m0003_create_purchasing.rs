use async_trait::async_trait;
use db_infra::{DbInfraError, Scope};
use sea_orm_migration::prelude::*;

use crate::m0001_create_users::Users;
use crate::m0002_create_suppliers_and_items::{Items, Suppliers};
use crate::{apply, SchemaMigration};

pub struct Migration;

#[derive(DeriveIden)]
enum PurchaseOrders {
    Table,
    Id,
    Reference,
    SupplierId,
    Status,
    OrderedBy,
    OrderedAt,
    ReceivedAt,
}

#[derive(DeriveIden)]
enum PurchaseOrderLines {
    Table,
    Id,
    PurchaseOrderId,
    ItemId,
    Quantity,
    UnitPrice,
}

#[async_trait]
impl SchemaMigration for Migration {
    fn name(&self) -> &str {
        "m0003_create_purchasing"
    }

    async fn up(&self, scope: &Scope) -> Result<(), DbInfraError> {
        let orders = Table::create()
            .table(PurchaseOrders::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(PurchaseOrders::Id)
                    .big_integer()
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .col(
                ColumnDef::new(PurchaseOrders::Reference)
                    .string()
                    .not_null()
                    .unique_key(),
            )
            .col(
                ColumnDef::new(PurchaseOrders::SupplierId)
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(PurchaseOrders::Status)
                    .string()
                    .not_null()
                    .default("open"),
            )
            .col(ColumnDef::new(PurchaseOrders::OrderedBy).big_integer().null())
            .col(
                ColumnDef::new(PurchaseOrders::OrderedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .col(
                ColumnDef::new(PurchaseOrders::ReceivedAt)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_purchase_orders_supplier")
                    .from(PurchaseOrders::Table, PurchaseOrders::SupplierId)
                    .to(Suppliers::Table, Suppliers::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_purchase_orders_ordered_by")
                    .from(PurchaseOrders::Table, PurchaseOrders::OrderedBy)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        apply(scope, &orders).await?;

        let lines = Table::create()
            .table(PurchaseOrderLines::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(PurchaseOrderLines::Id)
                    .big_integer()
                    .not_null()
                    .primary_key()
                    .auto_increment(),
            )
            .col(
                ColumnDef::new(PurchaseOrderLines::PurchaseOrderId)
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(PurchaseOrderLines::ItemId)
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(PurchaseOrderLines::Quantity)
                    .double()
                    .not_null(),
            )
            .col(ColumnDef::new(PurchaseOrderLines::UnitPrice).double().null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_purchase_order_lines_order")
                    .from(PurchaseOrderLines::Table, PurchaseOrderLines::PurchaseOrderId)
                    .to(PurchaseOrders::Table, PurchaseOrders::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_purchase_order_lines_item")
                    .from(PurchaseOrderLines::Table, PurchaseOrderLines::ItemId)
                    .to(Items::Table, Items::Id)
                    .on_delete(ForeignKeyAction::Restrict),
            )
            .to_owned();
        apply(scope, &lines).await
    }
}
