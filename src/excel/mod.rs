//! Spreadsheet input: tabular roster rows plus row-anchored embedded images
//!
//! The grid is read with calamine; the embedded profile photos are not part
//! of the cell grid, so a second pass opens the same workbook as a ZIP and
//! walks the drawing parts to map worksheet rows to image bytes.

pub mod images;
pub mod roster;

pub use images::{extract_row_images, RowImage};
pub use roster::{load_roster, Roster};
