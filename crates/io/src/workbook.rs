// Excel workbook loading (xlsx, xls, xlsb, ods) via calamine

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use payrec_core::Grid;

use crate::error::IoError;

/// Rows scanned per sheet. The header scan downstream looks at the first
/// 30 rows; data follows it, so 200 covers any realistic export.
const MAX_SCAN_ROWS: usize = 200;

/// Columns scanned per sheet (header scan window is 20).
const MAX_SCAN_COLS: usize = 40;

/// Load every sheet of a workbook as a dense string grid.
///
/// Cell values are reduced to display strings the way the engine expects
/// them: floats without a fractional part print as integers (phone numbers
/// arrive as floats), datetimes as their serial value.
pub fn load_grids(path: &Path) -> Result<Vec<Grid>, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::Workbook {
        path: path.display().to_string(),
        source: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut grids = Vec::with_capacity(sheet_names.len());

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IoError::Workbook {
                path: path.display().to_string(),
                source: format!("sheet '{sheet_name}': {e}"),
            })?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for row in range.rows().take(MAX_SCAN_ROWS) {
            let mut cells: Vec<String> = row
                .iter()
                .take(MAX_SCAN_COLS)
                .map(cell_to_string)
                .collect();
            // Trim trailing empties so ragged sheets stay small
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            rows.push(cells);
        }
        // Drop trailing all-empty rows
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        grids.push(Grid::new(sheet_name.clone(), rows));
    }

    Ok(grids)
}

/// First sheet only — the shape fee tables come in.
pub fn load_first_grid(path: &Path) -> Result<Grid, IoError> {
    let mut grids = load_grids(path)?;
    if grids.is_empty() {
        return Err(IoError::Workbook {
            path: path.display().to_string(),
            source: "workbook contains no sheets".into(),
        });
    }
    Ok(grids.remove(0))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(n) => {
            // Integers without decimals: phone numbers and whole amounts
            // must not grow a ".0" suffix.
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => format!("{n}"),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_cells_render_as_integers() {
        assert_eq!(cell_to_string(&Data::Float(23596771275.0)), "23596771275");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
    }

    #[test]
    fn string_cells_are_trimmed() {
        assert_eq!(cell_to_string(&Data::String("  TINA  ".into())), "TINA");
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let err = load_grids(Path::new("/nonexistent/export.xlsx")).unwrap_err();
        assert!(err.to_string().contains("cannot open workbook"));
    }
}
