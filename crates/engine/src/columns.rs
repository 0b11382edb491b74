//! Beneficiary-table column discovery.
//!
//! The export's header row floats: somewhere in the first 30 rows, any of
//! the first 20 columns. Column selection is an ordered list of matchers,
//! each a pure function over the grid; the first non-empty result wins.

use payrec_core::{BeneficiaryEntry, Grid};

/// Header scan window.
const HEADER_SCAN_ROWS: usize = 30;
const HEADER_SCAN_COLS: usize = 20;

/// Data rows sampled when judging whether a column holds text or numbers.
const SAMPLE_ROWS: usize = 10;

/// Phrases that mark the header row of the beneficiary table.
const HEADER_TOKENS: [&str; 5] = [
    "nom et prénom",
    "nom et prenom",
    "nom",
    "bénéficiaire",
    "beneficiaire",
];

/// Header tokens of a phone-bearing column.
const PHONE_TOKENS: [&str; 6] = ["tel", "phone", "mobile", "msisdn", "numéro", "numero"];

#[derive(Debug)]
pub struct Extraction {
    pub entries: Vec<BeneficiaryEntry>,
    pub sheet: String,
    pub header_row: usize,
    /// Which matcher picked the name column(s); diagnostic only.
    pub matcher: &'static str,
}

/// Extract beneficiary entries from the first sheet that has a
/// recognizable header row and at least one usable name.
pub fn extract_entries(grids: &[Grid]) -> Option<Extraction> {
    grids.iter().find_map(extract_from_grid)
}

fn extract_from_grid(grid: &Grid) -> Option<Extraction> {
    if grid.is_empty() {
        return None;
    }
    let header_row = find_header_row(grid)?;
    let (name_cols, matcher) = pick_name_columns(grid, header_row)?;
    let phone_col = find_phone_column(grid, header_row, &name_cols);

    let mut entries = Vec::new();
    for row in header_row + 1..grid.height() {
        let display_name = name_cols
            .iter()
            .map(|&c| grid.cell(row, c).trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if display_name.is_empty() {
            continue;
        }

        let phone_number = phone_col
            .map(|c| grid.cell(row, c).trim().to_string())
            .filter(|p| !p.is_empty());

        entries.push(BeneficiaryEntry { display_name, phone_number });
    }

    if entries.is_empty() {
        return None;
    }
    Some(Extraction {
        entries,
        sheet: grid.name.clone(),
        header_row,
        matcher,
    })
}

/// First row (within the scan window) holding a header phrase.
fn find_header_row(grid: &Grid) -> Option<usize> {
    for row in 0..grid.height().min(HEADER_SCAN_ROWS) {
        for col in 0..grid.width().min(HEADER_SCAN_COLS) {
            let cell = grid.cell(row, col).to_lowercase();
            if !cell.is_empty() && HEADER_TOKENS.iter().any(|t| cell.contains(t)) {
                return Some(row);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Name-column matchers, in priority order
// ---------------------------------------------------------------------------

type Matcher = (&'static str, fn(&Grid, usize) -> Option<Vec<usize>>);

const NAME_MATCHERS: [Matcher; 4] = [
    ("nom+prenom", match_nom_prenom),
    ("nom", match_nom),
    ("first-text-column", match_first_text_column),
    ("forced-first-column", match_forced_first),
];

fn pick_name_columns(grid: &Grid, header_row: usize) -> Option<(Vec<usize>, &'static str)> {
    NAME_MATCHERS
        .iter()
        .find_map(|(label, matcher)| matcher(grid, header_row).map(|cols| (cols, *label)))
}

/// Columns that jointly cover "nom" and "prénom": one combined header, or
/// a separate column per part (concatenated in column order).
fn match_nom_prenom(grid: &Grid, header_row: usize) -> Option<Vec<usize>> {
    let headers = header_cells(grid, header_row);

    let mut cols: Vec<usize> = Vec::new();
    let mut has_nom = false;
    let mut has_prenom = false;
    for (col, header) in &headers {
        let nom = header.contains("nom") && !header.contains("prénom") && !header.contains("prenom");
        let prenom = header.contains("prénom") || header.contains("prenom");
        if nom || prenom {
            cols.push(*col);
            has_nom |= nom || (header.contains("nom") && prenom);
            has_prenom |= prenom;
        }
    }
    (has_nom && has_prenom).then_some(cols)
}

/// First column whose header contains "nom".
fn match_nom(grid: &Grid, header_row: usize) -> Option<Vec<usize>> {
    header_cells(grid, header_row)
        .into_iter()
        .find(|(_, h)| h.contains("nom"))
        .map(|(col, _)| vec![col])
}

/// First column that is neither phone-labelled nor numeric-looking.
fn match_first_text_column(grid: &Grid, header_row: usize) -> Option<Vec<usize>> {
    for col in 0..grid.width().min(HEADER_SCAN_COLS) {
        let header = grid.cell(header_row, col).to_lowercase();
        if PHONE_TOKENS.iter().any(|t| header.contains(t)) {
            continue;
        }
        if column_is_textual(grid, header_row, col) {
            return Some(vec![col]);
        }
    }
    None
}

fn match_forced_first(_grid: &Grid, _header_row: usize) -> Option<Vec<usize>> {
    Some(vec![0])
}

fn header_cells(grid: &Grid, header_row: usize) -> Vec<(usize, String)> {
    (0..grid.width().min(HEADER_SCAN_COLS))
        .map(|col| (col, grid.cell(header_row, col).to_lowercase()))
        .filter(|(_, h)| !h.is_empty())
        .collect()
}

/// A column is textual when it has data and most of it is not bare
/// numbers (phone or amount columns read as numeric).
fn column_is_textual(grid: &Grid, header_row: usize, col: usize) -> bool {
    let mut non_empty = 0usize;
    let mut numeric = 0usize;
    for row in header_row + 1..grid.height().min(header_row + 1 + SAMPLE_ROWS) {
        let cell = grid.cell(row, col).trim();
        if cell.is_empty() {
            continue;
        }
        non_empty += 1;
        if looks_numeric(cell) {
            numeric += 1;
        }
    }
    non_empty > 0 && numeric * 2 <= non_empty
}

fn looks_numeric(s: &str) -> bool {
    let stripped: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '+' && *c != '-' && *c != '.' && *c != ',')
        .collect();
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

/// Phone column by header token, skipping columns already used for names.
fn find_phone_column(grid: &Grid, header_row: usize, name_cols: &[usize]) -> Option<usize> {
    (0..grid.width().min(HEADER_SCAN_COLS))
        .filter(|col| !name_cols.contains(col))
        .find(|&col| {
            let header = grid.cell(header_row, col).to_lowercase();
            PHONE_TOKENS.iter().any(|t| header.contains(t))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::new(
            "Feuil1",
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn combined_name_header_found() {
        let g = grid(&[
            &["", ""],
            &["N°", "Nom et prénoms", "Téléphone"],
            &["1", "TINA GANG-IRANGA", "23596771275"],
            &["2", "ABAKAR MAHAMAT", "23599887766"],
        ]);
        let ex = extract_entries(&[g]).unwrap();
        assert_eq!(ex.header_row, 1);
        assert_eq!(ex.matcher, "nom+prenom");
        assert_eq!(ex.entries.len(), 2);
        assert_eq!(ex.entries[0].display_name, "TINA GANG-IRANGA");
        assert_eq!(ex.entries[0].phone_number.as_deref(), Some("23596771275"));
    }

    #[test]
    fn separate_nom_and_prenom_columns_concatenate() {
        let g = grid(&[
            &["Nom", "Prénom", "Tel"],
            &["GANG-IRANGA", "TINA", "23596771275"],
        ]);
        let ex = extract_entries(&[g]).unwrap();
        assert_eq!(ex.matcher, "nom+prenom");
        assert_eq!(ex.entries[0].display_name, "GANG-IRANGA TINA");
    }

    #[test]
    fn nom_alone_matches() {
        let g = grid(&[
            &["Nom du bénéficiaire", "Montant"],
            &["ABAKAR MAHAMAT", "5000"],
        ]);
        let ex = extract_entries(&[g]).unwrap();
        assert_eq!(ex.matcher, "nom");
        assert_eq!(ex.entries[0].display_name, "ABAKAR MAHAMAT");
        assert!(ex.entries[0].phone_number.is_none());
    }

    #[test]
    fn text_column_fallback_when_header_is_vague() {
        // Header found via "bénéficiaire", but no column mentions "nom":
        // first textual column wins over the numeric ones.
        let g = grid(&[
            &["N°", "Bénéficiaire", "Montant"],
            &["1", "TINA GANG-IRANGA", "491741"],
            &["2", "ABAKAR MAHAMAT", "5000"],
        ]);
        let ex = extract_entries(&[g]).unwrap();
        assert_eq!(ex.matcher, "first-text-column");
        assert_eq!(ex.entries.len(), 2);
        assert_eq!(ex.entries[0].display_name, "TINA GANG-IRANGA");
    }

    #[test]
    fn blank_names_are_dropped() {
        let g = grid(&[
            &["Nom", "Tel"],
            &["TINA", "235111"],
            &["", "235222"],
            &["  ", "235333"],
            &["ABAKAR", "235444"],
        ]);
        let ex = extract_entries(&[g]).unwrap();
        assert_eq!(ex.entries.len(), 2);
    }

    #[test]
    fn sheet_without_header_yields_nothing() {
        let g = grid(&[&["1", "2"], &["3", "4"]]);
        assert!(extract_entries(&[g]).is_none());
    }

    #[test]
    fn second_sheet_wins_when_first_is_empty() {
        let empty = grid(&[&["junk", "data"]]);
        let good = grid(&[&["Nom", "Tel"], &["TINA", "235111"]]);
        let ex = extract_entries(&[empty, good]).unwrap();
        assert_eq!(ex.entries.len(), 1);
    }
}
