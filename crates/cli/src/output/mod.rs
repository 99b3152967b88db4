//! Output formatting for CLI results.

pub mod summary;
pub mod table;

pub use summary::{format_failure, format_success_headline};
pub use table::format_changes_table;
