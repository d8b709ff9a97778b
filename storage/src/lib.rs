pub mod catalog;
pub mod store;
pub mod wal;

pub use catalog::{ModuleCatalog, ModuleSummary};
pub use store::{ModuleStore, ProgressOptions, ProgressStats, StoreError, StoredModule};
