pub mod csv_file;
pub mod status_store;

use crate::error::Result;
use crate::types::RawRow;

/// A source of raw tabular rows (spreadsheet export, cloud sheet tab).
/// Implementations either return the full batch or fail with a
/// source-unavailable error; they never partially succeed silently.
pub trait RowSource {
    /// Identifier used in logs and error messages.
    fn source_name(&self) -> &str;

    /// Fetches every row of the backing table.
    fn fetch_rows(&self) -> Result<Vec<RawRow>>;
}
