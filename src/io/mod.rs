pub mod export;
pub mod import;

pub use export::{Exporter, TripSnapshot};
pub use import::{ImportError, ImportOptions, ImportResult, Importer};
