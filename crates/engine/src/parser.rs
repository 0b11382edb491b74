//! Tolerant bulk-report parsing.
//!
//! The export wraps every field in doubled quotes and pads values with
//! tabs; header position and field count vary between emitters. Parsing
//! runs as an ordered list of strategies, each returning what it could
//! recover, and only gives up when every strategy yields nothing.

use regex::Regex;

use payrec_core::{ReportPreamble, TransactionRecord, RECORD_FIELD_COUNT};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Substrings that identify the header row.
const HEADER_MARKERS: [&str; 4] = [
    "Record No",
    "Validation Result",
    "Credit Msisdn",
    "Transaction Timestamp",
];

#[derive(Debug)]
pub struct ParsedReport {
    pub records: Vec<TransactionRecord>,
    pub preamble: ReportPreamble,
    /// Rows with enough fields whose amount/recipient failed validation.
    pub dropped: usize,
    /// True when the strict pass found nothing and the relaxed CSV pass
    /// produced the rows.
    pub used_fallback: bool,
}

/// Parse the decoded report text into transaction records, file order
/// preserved. Fails only when both the strict and relaxed passes yield
/// zero usable rows.
pub fn parse_report(text: &str, config: &EngineConfig) -> Result<ParsedReport, EngineError> {
    let lines: Vec<&str> = text.lines().collect();
    let preamble = scrape_preamble(&lines);

    let header_idx = find_header_line(&lines).unwrap_or(config.header_fallback_offset);
    let data_start = header_idx + 1;

    let (records, dropped) = strict_pass(&lines, data_start, config);
    if !records.is_empty() {
        return Ok(ParsedReport { records, preamble, dropped, used_fallback: false });
    }

    let (records, dropped) = relaxed_pass(text, data_start, config);
    if !records.is_empty() {
        return Ok(ParsedReport { records, preamble, dropped, used_fallback: true });
    }

    Err(EngineError::MalformedInput {
        detail: "zero usable rows after strict and relaxed parsing".into(),
    })
}

/// First line containing any header marker.
fn find_header_line(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|line| HEADER_MARKERS.iter().any(|m| line.contains(m)))
}

/// Pull plan name / organization defaults out of the preamble. The value
/// sits on the line after its label, label and value both in the export's
/// noisy quoting.
fn scrape_preamble(lines: &[&str]) -> ReportPreamble {
    let mut preamble = ReportPreamble::default();

    for (i, line) in lines.iter().enumerate() {
        if line.contains("Bulk Plan Name") && preamble.plan_name.is_none() {
            if let Some(next) = lines.get(i + 1) {
                let value = next.split(',').nth(1).map(clean_preamble_value);
                preamble.plan_name = value.filter(|v| !v.is_empty());
            }
        }
        if line.contains("Organization Name") && preamble.organization.is_none() {
            if let Some(next) = lines.get(i + 1) {
                let value = next.split(',').next().map(clean_preamble_value);
                preamble.organization = value.filter(|v| !v.is_empty());
            }
        }
    }

    preamble
}

fn clean_preamble_value(raw: &str) -> String {
    raw.replace("\"\"", "").replace('"', "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Strict pass: per-line quoted extraction with a split fallback
// ---------------------------------------------------------------------------

fn strict_pass(
    lines: &[&str],
    data_start: usize,
    config: &EngineConfig,
) -> (Vec<TransactionRecord>, usize) {
    // Captures one quoted field, `""` standing for a literal quote.
    let quoted = Regex::new(r#""([^"]*(?:""[^"]*)*)""#).expect("static regex");

    let mut records = Vec::new();
    let mut dropped = 0;

    for line in lines.iter().skip(data_start) {
        let line = line.trim();
        if line.is_empty() || line == "\"\"" {
            continue;
        }

        let fields = quoted_fields(&quoted, line, config.min_fields_regex)
            .or_else(|| split_fields(line, config.min_fields_split));

        let Some(fields) = fields else { continue };
        match record_from_fields(fields) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    (records, dropped)
}

/// Quoted-segment extraction. Works on conventionally quoted CSV; on the
/// doubled-quote bulk format the pattern collapses the whole line into a
/// single capture, which fails the field minimum and routes the line to
/// [`split_fields`].
fn quoted_fields(quoted: &Regex, line: &str, min_fields: usize) -> Option<Vec<String>> {
    let fields: Vec<String> = quoted
        .captures_iter(line)
        .map(|c| c[1].replace("\"\"", "\"").trim().to_string())
        .collect();
    (fields.len() >= min_fields).then_some(fields)
}

/// Split extraction for the doubled-quote format: strip the outer wrapping,
/// split on the literal `,""` separator, scrub quote and tab noise.
fn split_fields(line: &str, min_fields: usize) -> Option<Vec<String>> {
    let line = line.trim_start_matches('"');
    // The wrapper leaves quote/comma residue after the last field; eaten
    // trailing empty fields come back as schema padding.
    let line = line.trim_end_matches(|c| c == '"' || c == ',');

    let fields: Vec<String> = line
        .split(",\"\"")
        .map(|part| part.replace("\"\"", "").replace('"', "").trim().to_string())
        .collect();
    (fields.len() >= min_fields).then_some(fields)
}

// ---------------------------------------------------------------------------
// Relaxed pass: conventional CSV, skipping the computed preamble
// ---------------------------------------------------------------------------

fn relaxed_pass(
    text: &str,
    data_start: usize,
    config: &EngineConfig,
) -> (Vec<TransactionRecord>, usize) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut dropped = 0;

    for (i, result) in reader.records().enumerate() {
        if i < data_start {
            continue;
        }
        let Ok(raw) = result else { continue };

        let fields: Vec<String> = raw
            .iter()
            .map(|f| f.trim().trim_matches('"').trim().to_string())
            .collect();
        if fields.len() < config.min_fields_split {
            continue;
        }

        match record_from_fields(fields) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    (records, dropped)
}

// ---------------------------------------------------------------------------
// Field normalization
// ---------------------------------------------------------------------------

/// Build a record from extracted fields: pad to the canonical schema,
/// truncate beyond it. Returns None (the row is dropped, and counted)
/// when the amount does not parse positive or the recipient is missing.
fn record_from_fields(mut fields: Vec<String>) -> Option<TransactionRecord> {
    // Pads short rows and truncates long ones to the canonical schema
    fields.resize(RECORD_FIELD_COUNT, String::new());

    let amount = match parse_amount(&fields[7]) {
        Some(a) if a > 0.0 => a,
        _ => return None,
    };
    if fields[2].trim().is_empty() {
        return None;
    }

    Some(TransactionRecord {
        record_no: fields[0].clone(),
        validation_result: fields[1].clone(),
        recipient_number: fields[2].clone(),
        transaction_timestamp: fields[3].clone(),
        finished_timestamp: fields[4].clone(),
        transaction_id: fields[5].clone(),
        details: fields[6].clone(),
        amount,
        fee_charge: parse_amount(&fields[8]).unwrap_or(0.0),
        extra_fee_charge: parse_amount(&fields[9]).unwrap_or(0.0),
        tax: parse_amount(&fields[10]).unwrap_or(0.0),
        status: fields[11].clone(),
        error_code: fields[12].clone(),
        error_message: fields[13].clone(),
    })
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A line in the export's doubled-quote format.
    fn bulk_line(no: u32, phone: &str, id: &str, amount: &str) -> String {
        format!(
            "\"\t{no},\"\"\tSuccess\"\",\"\"\t{phone}\"\",\"\"09-09-2025 10:51:17 AM\"\",\"\"09-09-2025 10:51:17 AM\"\",\"\"{id}\"\",\"\"Bulk Payment To Registered Customer\"\",\"\"{amount}\"\",\"\"0.00\"\",\"\"0.00\"\",\"\"0.00\"\",\"\"\tSucces\"\",\"",
        )
    }

    fn report(lines: &[String]) -> String {
        let mut text = String::new();
        for _ in 0..10 {
            text.push_str("\"Some preamble,metadata\"\n");
        }
        text.push_str("\"Record No\",\"Validation Result\",\"Credit Msisdn\",\"Transaction Timestamp\",\"Finished Timestamp\",\"TransactionID\",\"Transaction Details\",\"Amount\",\"Fee Charge\",\"Extra Fee Charge\",\"Tax\",\"Status\",\"Error Code\",\"Error Message\"\n");
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    #[test]
    fn parses_doubled_quote_format() {
        let text = report(&[
            bulk_line(1, "23596771275", "CI9510O2KX", "491741.00"),
            bulk_line(2, "23599887766", "CI9510O2KY", "5000.00"),
        ]);
        let parsed = parse_report(&text, &EngineConfig::default()).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert!(!parsed.used_fallback);
        let r = &parsed.records[0];
        assert_eq!(r.record_no, "1");
        assert_eq!(r.recipient_number, "23596771275");
        assert_eq!(r.transaction_id, "CI9510O2KX");
        assert_eq!(r.amount, 491741.0);
        assert_eq!(r.status, "Succes");
    }

    #[test]
    fn escaped_quotes_collapse_without_residue() {
        let text = report(&[bulk_line(1, "23596771275", "CI9510O2KX", "100.00")]);
        let parsed = parse_report(&text, &EngineConfig::default()).unwrap();
        // "".."" wrapping recovers the bare value: no quotes, no tabs
        assert_eq!(parsed.records[0].validation_result, "Success");
        assert!(!parsed.records[0].status.contains('"'));
        assert!(!parsed.records[0].status.contains('\t'));
    }

    #[test]
    fn header_position_is_discovered() {
        // Header at line 3 instead of the usual 13
        let mut text = String::from("\"meta\"\n\"meta\"\n\"meta\"\n");
        text.push_str("Record No,Validation Result,Credit Msisdn\n");
        text.push_str(&bulk_line(1, "23596771275", "CI9510O2KX", "100.00"));
        text.push('\n');
        let parsed = parse_report(&text, &EngineConfig::default()).unwrap();
        assert_eq!(parsed.records.len(), 1);
    }

    #[test]
    fn unparseable_amount_drops_row_and_counts_it() {
        let text = report(&[
            bulk_line(1, "23596771275", "CI9510O2KX", "not-a-number"),
            bulk_line(2, "23599887766", "CI9510O2KY", "5000.00"),
        ]);
        let parsed = parse_report(&text, &EngineConfig::default()).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn non_positive_amount_and_missing_recipient_excluded() {
        let text = report(&[
            bulk_line(1, "23596771275", "CI9510O2KX", "0.00"),
            bulk_line(2, "", "CI9510O2KY", "5000.00"),
            bulk_line(3, "23599887766", "CI9510O2KZ", "7500.00"),
        ]);
        let parsed = parse_report(&text, &EngineConfig::default()).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].transaction_id, "CI9510O2KZ");
        assert_eq!(parsed.dropped, 2);
    }

    #[test]
    fn relaxed_pass_reads_conventional_csv() {
        // Plain CSV without the doubled-quote wrapping and without a
        // 14-field shape: strict pass finds nothing, relaxed pass does.
        let mut text = String::new();
        for _ in 0..13 {
            text.push_str("preamble\n");
        }
        text.push_str("1,Success,23596771275,09-09-2025 10:51:17 AM,09-09-2025 10:51:17 AM,CI9510O2KX,Bulk Payment,491741.00\n");
        text.push_str("2,Success,23599887766,09-09-2025 10:52:00 AM,09-09-2025 10:52:00 AM,CI9510O2KY,Bulk Payment,5000.00\n");

        let parsed = parse_report(&text, &EngineConfig::default()).unwrap();
        assert!(parsed.used_fallback);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].amount, 491741.0);
        // Padded to the canonical schema
        assert_eq!(parsed.records[0].status, "");
    }

    #[test]
    fn fully_unusable_input_is_malformed() {
        let err = parse_report("nothing,here\nat,all\n", &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedInput { .. }));
    }

    #[test]
    fn preamble_defaults_scraped() {
        // Plan name is the second field of the line after its label,
        // organization the first field of the line after its own.
        let lines = vec![
            "\"No\",\"Bulk Plan Name\",\"Date\"",
            "\"1\",\"UGP Sept 2025\",\"09-09-2025\"",
            "\"Organization Name\",\"Account\"",
            "\"PAYMENTS SARL\",\"00123\"",
        ];
        let preamble = scrape_preamble(&lines);
        assert_eq!(preamble.plan_name.as_deref(), Some("UGP Sept 2025"));
        assert_eq!(preamble.organization.as_deref(), Some("PAYMENTS SARL"));
    }

    #[test]
    fn preamble_absent_is_none() {
        let lines = vec!["no labels here", "1,2,3"];
        let preamble = scrape_preamble(&lines);
        assert!(preamble.plan_name.is_none());
        assert!(preamble.organization.is_none());
    }
}
