//! Read the roster grid from an Excel worksheet

use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};

/// Rows above the first data row. Worksheet row numbers are 1-based, so data
/// row `i` (0-based) sits at worksheet row `i + HEADER_ROWS + 1`.
pub const HEADER_ROWS: u32 = 1;

/// One worksheet of roster data: a header row plus stringified data rows.
#[derive(Debug, Clone)]
pub struct Roster {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Roster {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Case-insensitive header lookup.
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Cell value for a named column in the given data row, trimmed.
    pub fn value<'a>(&self, row: &'a [String], header: &str) -> Option<&'a str> {
        let idx = self.header_index(header)?;
        row.get(idx).map(|s| s.trim())
    }

    /// 1-based worksheet row for a 0-based data row index.
    pub fn worksheet_row(&self, index: usize) -> u32 {
        index as u32 + HEADER_ROWS + 1
    }

    /// Iterate `(header, cell)` pairs for one data row.
    pub fn columns<'a>(&'a self, row: &'a [String]) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

/// Convert a cell to its text form. Whole-number floats drop the fraction so
/// numeric room codes read back as entered (`101`, not `101.0`).
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

/// Read the roster from an open workbook; first sheet unless one is named.
pub fn read_roster<R: Read + Seek>(workbook: &mut Xlsx<R>, sheet: Option<&str>) -> Result<Roster> {
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .context("Workbook has no sheets")?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows = range.rows().map(|r| r.to_vec());
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => bail!("Sheet '{}' is empty", sheet_name),
    };

    let roster = Roster {
        headers,
        rows: rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect(),
    };

    for required in ["Mail id", "Staff Name"] {
        if roster.header_index(required).is_none() {
            bail!("Sheet '{}' is missing required column '{}'", sheet_name, required);
        }
    }

    Ok(roster)
}

/// Open a workbook file and read its roster.
pub fn load_roster<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<Roster> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;
    read_roster(&mut workbook, sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Xlsx;
    use rust_xlsxwriter::Workbook;
    use std::io::Cursor;

    fn build_workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                worksheet
                    .write_string(r as u32, c as u16, *cell)
                    .expect("write cell");
            }
        }
        workbook.save_to_buffer().expect("save workbook")
    }

    fn open(buf: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        Xlsx::new(Cursor::new(buf)).expect("open workbook")
    }

    #[test]
    fn test_reads_headers_and_rows() {
        let buf = build_workbook(&[
            &["Staff Name", "Mail id", "M1", "Th7"],
            &["Alice", "alice@college.edu", "Math", ""],
            &["Bob", "bob@college.edu", "", "Lab"],
        ]);
        let roster = read_roster(&mut open(buf), None).unwrap();

        assert_eq!(roster.rows().len(), 2);
        let first = &roster.rows()[0];
        assert_eq!(roster.value(first, "mail id"), Some("alice@college.edu"));
        assert_eq!(roster.value(first, "Staff Name"), Some("Alice"));
        assert_eq!(roster.worksheet_row(0), 2);
        assert_eq!(roster.worksheet_row(1), 3);
    }

    #[test]
    fn test_missing_required_column() {
        let buf = build_workbook(&[&["Staff Name", "Dept"], &["Alice", "CSE"]]);
        let err = read_roster(&mut open(buf), None).unwrap_err();
        assert!(err.to_string().contains("Mail id"));
    }

    #[test]
    fn test_numeric_cells_render_without_fraction() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Staff Name").unwrap();
        worksheet.write_string(0, 1, "Mail id").unwrap();
        worksheet.write_string(0, 2, "M1").unwrap();
        worksheet.write_string(1, 0, "Alice").unwrap();
        worksheet.write_string(1, 1, "alice@college.edu").unwrap();
        worksheet.write_number(1, 2, 101.0).unwrap();
        let buf = workbook.save_to_buffer().unwrap();

        let roster = read_roster(&mut open(buf), None).unwrap();
        assert_eq!(roster.value(&roster.rows()[0], "M1"), Some("101"));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("  x ".into())), "x");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Float(3.0)), "3");
    }
}
