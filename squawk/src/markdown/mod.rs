//! Markdown helpers for the merge request summary.

pub mod section;
pub mod table;

pub use section::{extract_section, patch_section};
pub use table::{TableRow, parse_table, render_table};
