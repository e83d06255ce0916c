use db_infra::{ConnectionProvider, DbInfraError, ListResponse, Statement};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-item consumption across production lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromQueryResult)]
pub struct ItemUsage {
    pub item_id: i64,
    pub sku: String,
    pub name: String,
    pub lot_count: i64,
    pub quantity_consumed: f64,
}

const USAGE_SQL: &str = "\
SELECT i.id AS item_id, i.sku AS sku, i.name AS name, \
       COUNT(DISTINCT lc.lot_id) AS lot_count, \
       COALESCE(SUM(lc.quantity), 0.0) AS quantity_consumed \
FROM items i \
LEFT JOIN lot_components lc ON lc.item_id = i.id \
GROUP BY i.id, i.sku, i.name \
ORDER BY i.sku";

/// Every item with the number of lots that consumed it and the total
/// quantity consumed. Items never used report zero.
pub async fn usage_report(
    provider: &ConnectionProvider,
) -> Result<ListResponse<ItemUsage>, DbInfraError> {
    let rows = provider
        .with_scope(|scope| {
            Box::pin(async move {
                let stmt = Statement::from_string(scope.backend(), USAGE_SQL);
                let rows = ItemUsage::find_by_statement(stmt)
                    .all(scope.connection()?)
                    .await?;
                Ok::<_, DbInfraError>(rows)
            })
        })
        .await?;
    debug!(items = rows.len(), "usage_report=done");
    Ok(ListResponse::ok(rows))
}
