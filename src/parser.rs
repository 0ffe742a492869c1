//! Spreadsheet parsing into raw tabular rows.
//!
//! The catalog query restricts content type, so the parser is picked by file
//! extension: `.csv` through the csv reader, anything else as an xlsx
//! workbook (first worksheet, first row as header). All cells come out as
//! strings; typing them is the normalizer's job.

use std::io::Cursor;

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx};

/// A parsed spreadsheet: one header row plus data rows, all as strings.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parses spreadsheet bytes into a [`RawTable`].
///
/// # Errors
///
/// Returns an error if the bytes are not a readable workbook or CSV stream.
pub fn parse_table(file_name: &str, bytes: &[u8]) -> Result<RawTable> {
    if file_name.to_ascii_lowercase().ends_with(".csv") {
        parse_csv(bytes)
    } else {
        parse_xlsx(bytes)
    }
}

fn parse_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).context("not a readable xlsx workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("first worksheet is unreadable")?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };

    Ok(RawTable {
        header: header_row.iter().map(cell_to_string).collect(),
        rows: rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect(),
    })
}

fn parse_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut rdr = csv::Reader::from_reader(bytes);

    let header = rdr
        .headers()
        .context("csv header row is unreadable")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.context("csv row is unreadable")?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { header, rows })
}

/// Renders one workbook cell as text. Date cells are formatted so the
/// normalizer's timestamp parsing sees a uniform shape regardless of how
/// Excel stored them.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| naive.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_header_and_rows() {
        let bytes = b"Device Name,License Plate,Passing Time\nSEITHUNGANALLUR,ABC123,2026-08-01 10:00:00\n";
        let table = parse_table("anpr_data_1.csv", bytes).unwrap();

        assert_eq!(
            table.header,
            vec!["Device Name", "License Plate", "Passing Time"]
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], "ABC123");
    }

    #[test]
    fn test_parse_csv_quoted_fields() {
        let bytes = b"Device Name,License Plate\n\"SEITHUNGANALLUR, NORTH\",ABC123\n";
        let table = parse_table("data.csv", bytes).unwrap();
        assert_eq!(table.rows[0][0], "SEITHUNGANALLUR, NORTH");
    }

    #[test]
    fn test_parse_invalid_xlsx_bytes() {
        let result = parse_table("anpr_data_1.xlsx", &[0xFF, 0xFE, 0x00, 0x01]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cell_to_string_numeric_plate() {
        // Plates made of digits come out of Excel as floats.
        assert_eq!(cell_to_string(&Data::Float(1234.0)), "1234");
        assert_eq!(cell_to_string(&Data::Int(1234)), "1234");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
