use crate::source::EmbeddedSql;
use crate::{
    m0001_create_users, m0002_create_suppliers_and_items, m0003_create_purchasing,
    m0004_create_production, m0005_create_import_batches, SchemaMigration,
};

const LOOKUP_INDEXES: EmbeddedSql = EmbeddedSql::new(
    "m0006_lookup_indexes",
    include_str!("../sql/m0006_lookup_indexes.sql"),
);

/// Ordered set of migrations, addressable by name.
pub struct Catalog {
    migrations: Vec<Box<dyn SchemaMigration>>,
}

impl Catalog {
    pub fn new(migrations: Vec<Box<dyn SchemaMigration>>) -> Self {
        Self { migrations }
    }

    /// The inventory schema, oldest first.
    pub fn inventory() -> Self {
        Self::new(vec![
            Box::new(m0001_create_users::Migration),
            Box::new(m0002_create_suppliers_and_items::Migration),
            Box::new(m0003_create_purchasing::Migration),
            Box::new(m0004_create_production::Migration),
            Box::new(m0005_create_import_batches::Migration),
            Box::new(LOOKUP_INDEXES),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&dyn SchemaMigration> {
        self.migrations
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SchemaMigration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}
