//! Fee-interleaving detection.
//!
//! Some emitters append one fee pseudo-row per payment, doubling the row
//! count; the schema itself gives no way to tell them apart. Detection
//! works from amount and timestamp statistics: payments first, their fee
//! rows in the same order in the second half of the file.

use std::collections::{BTreeSet, HashMap};

use payrec_core::TransactionRecord;

use crate::model::FormatReport;
use crate::time::second_key;

/// Second-half amounts below this share of their first-half partner read
/// as fees.
const FEE_RATIO: f64 = 0.05;

/// Last-quarter mean below this share of the first-quarter mean reads as
/// fees clustered at the end.
const QUARTER_MEAN_RATIO: f64 = 0.1;

/// Inspect the parsed rows and decide whether the second half is fee rows.
pub fn classify(records: &[TransactionRecord]) -> FormatReport {
    let n = records.len();
    let mut evidence = Vec::new();

    if n < 2 {
        evidence.push("fewer than 2 rows; no interleaved fees possible".to_string());
        return without_fees(n, evidence);
    }
    if n % 2 != 0 {
        evidence.push("odd row count; fee rows would pair with payments".to_string());
        return without_fees(n, evidence);
    }

    let mid = n / 2;
    let mut confidence: u8 = 0;
    let mut fee_pattern = false;

    // 1. Duplicate timestamps: payment and fee rows carry the same second.
    let mut buckets: HashMap<String, usize> = HashMap::new();
    for r in records {
        *buckets.entry(second_key(&r.transaction_timestamp)).or_insert(0) += 1;
    }
    let even_buckets = buckets.values().filter(|&&c| c % 2 == 0).count();
    let duplicate_timestamps = even_buckets > 0;
    if duplicate_timestamps {
        evidence.push(format!("{even_buckets} timestamp bucket(s) with an even member count"));
    }

    // 2. Pairwise ratio second-half / first-half.
    let ratios: Vec<f64> = (0..mid)
        .filter(|&i| records[i].amount > 0.0)
        .map(|i| records[mid + i].amount / records[i].amount)
        .collect();
    let under = ratios.iter().filter(|&&r| r < FEE_RATIO).count();
    if !ratios.is_empty() && under == ratios.len() {
        fee_pattern = true;
        confidence = 95;
        evidence.push(format!("all {} half-to-half amount ratios under 5%", ratios.len()));
    } else if under > 0 {
        confidence = 60;
        evidence.push(format!("partial ratio pattern: {under}/{} under 5%", ratios.len()));
    }

    // 3. Small amounts clustered at the end. Supportive only: raises
    // confidence, never lowers it.
    if n >= 4 {
        let q = n / 4;
        let first_mean = mean(&records[..q]);
        let last_mean = mean(&records[n - q..]);
        if first_mean > 0.0 && last_mean < first_mean * QUARTER_MEAN_RATIO {
            fee_pattern = true;
            confidence = confidence.max(80);
            evidence.push("last-quarter mean amount below 10% of first-quarter mean".to_string());
        }
    }

    // 4. Same recipients in both halves.
    let first_half: BTreeSet<&str> = records[..mid]
        .iter()
        .map(|r| r.recipient_number.as_str())
        .collect();
    let second_half: BTreeSet<&str> = records[mid..]
        .iter()
        .map(|r| r.recipient_number.as_str())
        .collect();
    if first_half == second_half {
        confidence = confidence.saturating_add(20).min(100);
        evidence.push("identical recipient sets in both halves".to_string());
    }

    // A small second payment with its own timestamp must not read as a
    // fee row: the amount pattern needs the timestamp signal behind it.
    if duplicate_timestamps && fee_pattern {
        FormatReport {
            fee_interleaved: true,
            principal_count: mid,
            confidence,
            evidence,
        }
    } else {
        without_fees(n, evidence)
    }
}

/// Keep only principal rows. Payment rows precede their paired fee rows,
/// so the cut is a prefix.
pub fn apply_filter(mut records: Vec<TransactionRecord>, report: &FormatReport) -> Vec<TransactionRecord> {
    records.truncate(report.principal_count);
    records
}

fn without_fees(n: usize, evidence: Vec<String>) -> FormatReport {
    FormatReport {
        fee_interleaved: false,
        principal_count: n,
        confidence: 100,
        evidence,
    }
}

fn mean(records: &[TransactionRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.amount).sum::<f64>() / records.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(no: u32, phone: &str, timestamp: &str, amount: f64) -> TransactionRecord {
        TransactionRecord {
            record_no: no.to_string(),
            validation_result: "Success".into(),
            recipient_number: phone.into(),
            transaction_timestamp: timestamp.into(),
            finished_timestamp: timestamp.into(),
            transaction_id: format!("TX{no}"),
            details: "Bulk Payment To Registered Customer".into(),
            amount,
            fee_charge: 0.0,
            extra_fee_charge: 0.0,
            tax: 0.0,
            status: "Succes".into(),
            error_code: String::new(),
            error_message: String::new(),
        }
    }

    const T1: &str = "09-09-2025 10:51:17 AM";
    const T2: &str = "09-09-2025 10:52:03 AM";

    #[test]
    fn two_distinct_payments_are_not_fees() {
        // 5000/491741 is ~1%, but the timestamps differ: two real payments.
        let records = vec![rec(1, "235111", T1, 491741.0), rec(2, "235222", T2, 5000.0)];
        let report = classify(&records);
        assert!(!report.fee_interleaved);
        assert_eq!(report.principal_count, 2);
        assert_eq!(report.confidence, 100);
    }

    #[test]
    fn interleaved_fees_detected() {
        // Two payments then their two fee rows, all stamped the same
        // second; 8261/491741 and 84/5000 are both ~1.68%.
        let records = vec![
            rec(1, "235111", T1, 491741.0),
            rec(2, "235222", T1, 5000.0),
            rec(3, "235111", T1, 8261.0),
            rec(4, "235222", T1, 84.0),
        ];
        let report = classify(&records);
        assert!(report.fee_interleaved);
        assert_eq!(report.principal_count, 2);
        assert!(report.confidence >= 95);
    }

    #[test]
    fn odd_row_count_is_deterministic() {
        let records = vec![
            rec(1, "235111", T1, 1000.0),
            rec(2, "235222", T1, 10.0),
            rec(3, "235333", T1, 10.0),
        ];
        let report = classify(&records);
        assert!(!report.fee_interleaved);
        assert_eq!(report.principal_count, 3);
        assert_eq!(report.confidence, 100);
    }

    #[test]
    fn identical_recipients_boost_confidence() {
        let records = vec![
            rec(1, "235111", T1, 100000.0),
            rec(2, "235222", T1, 200000.0),
            rec(3, "235111", T1, 1680.0),
            rec(4, "235222", T1, 3360.0),
        ];
        let report = classify(&records);
        assert!(report.fee_interleaved);
        // 95 from ratios, +20 capped at 100
        assert_eq!(report.confidence, 100);
        assert!(report
            .evidence
            .iter()
            .any(|e| e.contains("identical recipient sets")));
    }

    #[test]
    fn partial_ratio_alone_does_not_flip() {
        // One pair ratio under 5%, one over; no quarter-mean signal.
        let records = vec![
            rec(1, "235111", T1, 1000.0),
            rec(2, "235222", T1, 1000.0),
            rec(3, "235333", T1, 10.0),
            rec(4, "235444", T1, 900.0),
        ];
        let report = classify(&records);
        assert!(!report.fee_interleaved);
        assert_eq!(report.principal_count, 4);
    }

    #[test]
    fn quarter_mean_signal_flips_with_duplicate_timestamps() {
        // Ratios are not uniformly under 5% (second pair is 50%), but the
        // file ends in tiny amounts and timestamps repeat.
        let records = vec![
            rec(1, "235111", T1, 100000.0),
            rec(2, "235222", T1, 100.0),
            rec(3, "235333", T1, 50.0),
            rec(4, "235444", T1, 50.0),
        ];
        let report = classify(&records);
        assert!(report.fee_interleaved);
        assert_eq!(report.principal_count, 2);
        assert!(report.confidence >= 80);
    }

    #[test]
    fn filter_keeps_prefix() {
        let records = vec![
            rec(1, "235111", T1, 491741.0),
            rec(2, "235222", T1, 5000.0),
            rec(3, "235111", T1, 8261.0),
            rec(4, "235222", T1, 84.0),
        ];
        let report = classify(&records);
        let kept = apply_filter(records, &report);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].transaction_id, "TX1");
        assert_eq!(kept[1].transaction_id, "TX2");
    }
}
