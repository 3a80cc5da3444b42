//! Sample application: reusable table choosers sharing one session store.
pub mod cache_cell;
pub mod catalog;
pub mod chooser;
pub mod page;

pub use catalog::{sample_catalog, CachedCatalog, Catalog, MemoryCatalog};
pub use chooser::{TableChooser, TableSelection};
