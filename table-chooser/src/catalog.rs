//! Database catalog browsed by the table chooser.
use crate::cache_cell::CacheCell;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use tracing::trace;

/// Lists the objects of a database server.
pub trait Catalog {
    fn databases(&self) -> Result<Vec<String>>;
    fn schemas(&self, database: &str) -> Result<Vec<String>>;
    fn tables(&self, database: &str, schema: &str) -> Result<Vec<String>>;
}

/// A catalog held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    databases: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl MemoryCatalog {
    pub fn new() -> MemoryCatalog {
        MemoryCatalog::default()
    }

    pub fn with_table(mut self, database: &str, schema: &str, table: &str) -> MemoryCatalog {
        let tables = self
            .databases
            .entry(database.to_owned())
            .or_default()
            .entry(schema.to_owned())
            .or_default();
        if !tables.iter().any(|t| t == table) {
            tables.push(table.to_owned());
            tables.sort();
        }
        self
    }

    fn schema_map(&self, database: &str) -> Result<&BTreeMap<String, Vec<String>>> {
        self.databases
            .get(database)
            .ok_or_else(|| anyhow!("database `{}` does not exist", database))
    }
}

impl Catalog for MemoryCatalog {
    fn databases(&self) -> Result<Vec<String>> {
        Ok(self.databases.keys().cloned().collect())
    }

    fn schemas(&self, database: &str) -> Result<Vec<String>> {
        Ok(self.schema_map(database)?.keys().cloned().collect())
    }

    fn tables(&self, database: &str, schema: &str) -> Result<Vec<String>> {
        self.schema_map(database)?
            .get(schema)
            .cloned()
            .ok_or_else(|| anyhow!("schema `{}`.`{}` does not exist", database, schema))
    }
}

/// Catalog wrapper that remembers the last answer to each query.
pub struct CachedCatalog<C> {
    inner: C,
    databases: CacheCell<(), Vec<String>>,
    schemas: CacheCell<String, Vec<String>>,
    tables: CacheCell<(String, String), Vec<String>>,
}

impl<C: Catalog> CachedCatalog<C> {
    pub fn new(inner: C) -> CachedCatalog<C> {
        CachedCatalog {
            inner,
            databases: CacheCell::new(),
            schemas: CacheCell::new(),
            tables: CacheCell::new(),
        }
    }
}

impl<C: Catalog> Catalog for CachedCatalog<C> {
    fn databases(&self) -> Result<Vec<String>> {
        self.databases.try_cache((), |_| {
            trace!("show databases");
            self.inner.databases()
        })
    }

    fn schemas(&self, database: &str) -> Result<Vec<String>> {
        self.schemas.try_cache(database.to_owned(), |database| {
            trace!(database = %database, "show schemas");
            self.inner.schemas(database)
        })
    }

    fn tables(&self, database: &str, schema: &str) -> Result<Vec<String>> {
        self.tables
            .try_cache((database.to_owned(), schema.to_owned()), |(database, schema)| {
                trace!(database = %database, schema = %schema, "show tables");
                self.inner.tables(database, schema)
            })
    }
}

/// The catalog used by the demo and the tests.
pub fn sample_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_table("SALES", "PUBLIC", "ORDERS")
        .with_table("SALES", "PUBLIC", "LINE_ITEMS")
        .with_table("SALES", "ARCHIVE", "ORDERS_2019")
        .with_table("SCRATCH", "PUBLIC", "CUSTOMERS")
        .with_table("SCRATCH", "PUBLIC", "PRODUCTS")
}
