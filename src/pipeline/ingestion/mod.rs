pub mod columns;

pub use columns::{fold, ColumnMap, Field};
