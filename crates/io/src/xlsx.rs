// Spreadsheet import (xlsx, xlsm, xls)
//
// Only the first sheet is read. Its first row is the header row; every
// other row becomes a record. Cell values are rendered to text the way they
// would be shown in a CSV export of the same sheet.

use std::fmt::Display;
use std::io::{Cursor, Read, Seek};

use calamine::{Data, Reader, Xls, Xlsx};
use chrono::NaiveTime;

use crate::document::{unique_headers, SpreadsheetFormat, Table};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse spreadsheet bytes into a table.
pub fn import_from_bytes(bytes: &[u8], format: SpreadsheetFormat) -> Result<Table, String> {
    let cursor = Cursor::new(bytes);
    match format {
        SpreadsheetFormat::Xlsx => {
            let workbook: Xlsx<_> =
                Xlsx::new(cursor).map_err(|e| format!("Failed to open Excel file: {}", e))?;
            first_sheet_table(workbook)
        }
        SpreadsheetFormat::Xls => {
            let workbook: Xls<_> =
                Xls::new(cursor).map_err(|e| format!("Failed to open Excel file: {}", e))?;
            first_sheet_table(workbook)
        }
    }
}

fn first_sheet_table<RS, R>(mut workbook: R) -> Result<Table, String>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let sheet_names = workbook.sheet_names();
    let Some(sheet_name) = sheet_names.first() else {
        return Err("Excel file contains no sheets".to_string());
    };

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };

    let mut table = Table::new(unique_headers(header_row.iter().map(cell_to_string)));
    for row in rows {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        table.push_row(cells);
    }

    log::debug!(
        "sheet '{}': {} columns, {} rows",
        sheet_name,
        table.headers.len(),
        table.len()
    );
    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            // Time-only cells are fractions of a day, not dates in 1899
            if dt.is_duration() || (0.0..1.0).contains(&serial) {
                return time_of_day(serial).unwrap_or_else(|| serial.to_string());
            }
            match dt.as_datetime() {
                Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => serial.to_string(),
            }
        }
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// `HH:MM:SS` for the fractional-day part of a serial, rounded to the second.
fn time_of_day(serial: f64) -> Option<String> {
    let secs = (serial.fract().abs() * SECONDS_PER_DAY).round() as u32 % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
}
