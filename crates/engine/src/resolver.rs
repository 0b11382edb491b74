//! Beneficiary resolution.
//!
//! Strategy selection is a deterministic decision table over the two
//! cardinalities (transactions T, beneficiary entries E); the strategies
//! themselves never fail — every transaction leaves with a name, tagged
//! placeholders as the terminal fallback.

use std::collections::HashMap;

use payrec_core::{BeneficiaryEntry, ReconWarning, TransactionRecord};

use crate::cache::NameCache;
use crate::model::MappingStrategy;

pub const PLACEHOLDER_PREFIX: &str = "BENEFICIAIRE_";

#[derive(Debug)]
pub struct Resolution {
    /// One name per transaction, same order.
    pub names: Vec<String>,
    pub strategy: MappingStrategy,
    pub placeholder_count: usize,
    pub warnings: Vec<ReconWarning>,
}

/// Pick the strategy from the decision table.
pub fn choose_strategy(t: usize, e: usize, unique_recipients: usize) -> MappingStrategy {
    if t == 0 {
        MappingStrategy::None
    } else if e == 0 {
        MappingStrategy::Fallback
    } else if t == e {
        MappingStrategy::OneToOne
    } else if e > t {
        MappingStrategy::ByPhone
    } else if unique_recipients <= e {
        MappingStrategy::WithDuplication
    } else {
        MappingStrategy::Partial
    }
}

/// Resolve a name for every transaction.
pub fn resolve(
    records: &[TransactionRecord],
    entries: &[BeneficiaryEntry],
    cache: &mut dyn NameCache,
) -> Resolution {
    let unique_recipients = {
        let mut phones: Vec<String> = records
            .iter()
            .map(|r| normalize_phone(&r.recipient_number))
            .collect();
        phones.sort();
        phones.dedup();
        phones.len()
    };

    let strategy = choose_strategy(records.len(), entries.len(), unique_recipients);
    let mut warnings = Vec::new();

    let names = match strategy {
        MappingStrategy::None => Vec::new(),
        MappingStrategy::Fallback => {
            warnings.push(ReconWarning::NoBeneficiaryData);
            records
                .iter()
                .enumerate()
                .map(|(i, _)| positional_placeholder(i))
                .collect()
        }
        MappingStrategy::OneToOne => one_to_one(records, entries, cache),
        MappingStrategy::ByPhone => by_phone(records, entries, cache, &mut warnings),
        MappingStrategy::WithDuplication => {
            warnings.push(ReconWarning::AmbiguousMapping {
                strategy: strategy.to_string(),
                detail: format!(
                    "{} transactions share {} unique recipient number(s)",
                    records.len(),
                    unique_recipients
                ),
            });
            with_duplication(records, entries, cache, &mut warnings)
        }
        MappingStrategy::Partial => {
            warnings.push(ReconWarning::AmbiguousMapping {
                strategy: strategy.to_string(),
                detail: format!(
                    "only {} beneficiaries for {} transactions; names recycle by index",
                    entries.len(),
                    records.len()
                ),
            });
            partial(records, entries, cache)
        }
    };

    let placeholder_count = names
        .iter()
        .filter(|n| n.starts_with(PLACEHOLDER_PREFIX))
        .count();
    if placeholder_count > 0 {
        warnings.push(ReconWarning::PlaceholdersUsed { count: placeholder_count });
    }

    Resolution { names, strategy, placeholder_count, warnings }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn one_to_one(
    records: &[TransactionRecord],
    entries: &[BeneficiaryEntry],
    cache: &mut dyn NameCache,
) -> Vec<String> {
    records
        .iter()
        .zip(entries)
        .map(|(record, entry)| {
            cache.put(&normalize_phone(&record.recipient_number), &entry.display_name);
            entry.display_name.clone()
        })
        .collect()
}

fn by_phone(
    records: &[TransactionRecord],
    entries: &[BeneficiaryEntry],
    cache: &mut dyn NameCache,
    warnings: &mut Vec<ReconWarning>,
) -> Vec<String> {
    let phone_map = build_phone_map(entries, warnings);

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let phone = normalize_phone(&record.recipient_number);
            if let Some(name) = phone_map.get(&phone) {
                cache.put(&phone, name);
                (*name).to_string()
            } else if let Some(name) = cache.get(&phone) {
                name
            } else {
                phone_placeholder(&phone, i)
            }
        })
        .collect()
}

fn with_duplication(
    records: &[TransactionRecord],
    entries: &[BeneficiaryEntry],
    cache: &mut dyn NameCache,
    warnings: &mut Vec<ReconWarning>,
) -> Vec<String> {
    let phone_map = build_phone_map(entries, warnings);

    // Group membership is by normalized phone; all members get one name.
    let mut group_names: HashMap<String, String> = HashMap::new();
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let phone = normalize_phone(&record.recipient_number);
            if let Some(name) = group_names.get(&phone) {
                return name.clone();
            }
            let name = if let Some(name) = phone_map.get(&phone) {
                cache.put(&phone, name);
                (*name).to_string()
            } else if let Some(name) = cache.get(&phone) {
                name
            } else {
                phone_placeholder(&phone, i)
            };
            group_names.insert(phone, name.clone());
            name
        })
        .collect()
}

fn partial(
    records: &[TransactionRecord],
    entries: &[BeneficiaryEntry],
    cache: &mut dyn NameCache,
) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let entry = &entries[i % entries.len()];
            cache.put(&normalize_phone(&record.recipient_number), &entry.display_name);
            entry.display_name.clone()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Mechanics
// ---------------------------------------------------------------------------

/// Strip spaces and one leading `+`. Exact match beyond that; no fuzzy
/// phone matching, no country-code rewriting.
pub fn normalize_phone(raw: &str) -> String {
    let no_spaces: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    no_spaces.strip_prefix('+').unwrap_or(&no_spaces).to_string()
}

fn build_phone_map<'a>(
    entries: &'a [BeneficiaryEntry],
    warnings: &mut Vec<ReconWarning>,
) -> HashMap<String, &'a str> {
    let mut map: HashMap<String, &'a str> = HashMap::new();
    for entry in entries {
        let Some(phone) = entry.phone_number.as_deref() else { continue };
        let phone = normalize_phone(phone);
        if phone.is_empty() {
            continue;
        }
        // First entry wins; a conflicting duplicate is worth flagging
        if let Some(existing) = map.get(&phone) {
            if *existing != entry.display_name {
                warnings.push(ReconWarning::ConflictingDuplicate { phone: phone.clone() });
            }
        } else {
            map.insert(phone, entry.display_name.as_str());
        }
    }
    map
}

fn positional_placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{}", index + 1)
}

/// Placeholder from the last 4 phone digits when a phone exists, else
/// from the 1-based position.
fn phone_placeholder(phone: &str, index: usize) -> String {
    if phone.len() >= 4 {
        format!("{PLACEHOLDER_PREFIX}{}", &phone[phone.len() - 4..])
    } else if !phone.is_empty() {
        format!("{PLACEHOLDER_PREFIX}{phone}")
    } else {
        positional_placeholder(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, NoCache};

    fn rec(phone: &str) -> TransactionRecord {
        TransactionRecord {
            record_no: "1".into(),
            validation_result: "Success".into(),
            recipient_number: phone.into(),
            transaction_timestamp: "09-09-2025 10:51:17 AM".into(),
            finished_timestamp: "09-09-2025 10:51:17 AM".into(),
            transaction_id: "TX".into(),
            details: String::new(),
            amount: 1000.0,
            fee_charge: 0.0,
            extra_fee_charge: 0.0,
            tax: 0.0,
            status: "Succes".into(),
            error_code: String::new(),
            error_message: String::new(),
        }
    }

    fn entry(name: &str, phone: Option<&str>) -> BeneficiaryEntry {
        BeneficiaryEntry {
            display_name: name.into(),
            phone_number: phone.map(String::from),
        }
    }

    #[test]
    fn strategy_table() {
        use MappingStrategy::*;
        assert_eq!(choose_strategy(0, 5, 0), None);
        assert_eq!(choose_strategy(3, 0, 3), Fallback);
        assert_eq!(choose_strategy(2, 2, 2), OneToOne);
        assert_eq!(choose_strategy(2, 5, 2), ByPhone);
        assert_eq!(choose_strategy(5, 2, 2), WithDuplication);
        assert_eq!(choose_strategy(5, 2, 5), Partial);
    }

    #[test]
    fn one_to_one_pairs_by_position() {
        let records = vec![rec("235111"), rec("235222")];
        let entries = vec![entry("TINA", Some("235111")), entry("ABAKAR", Some("235222"))];
        let r = resolve(&records, &entries, &mut NoCache);
        assert_eq!(r.strategy, MappingStrategy::OneToOne);
        assert_eq!(r.names, vec!["TINA", "ABAKAR"]);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn by_phone_matches_and_placeholders() {
        let records = vec![rec("23596771275"), rec("23500000000")];
        let entries = vec![
            entry("TINA", Some("235 96 77 12 75")),
            entry("ABAKAR", Some("+23599887766")),
            entry("MOUSSA", Some("23511111111")),
        ];
        let r = resolve(&records, &entries, &mut NoCache);
        assert_eq!(r.strategy, MappingStrategy::ByPhone);
        assert_eq!(r.names[0], "TINA"); // spaces stripped on the entry side
        assert_eq!(r.names[1], "BENEFICIAIRE_0000"); // last 4 digits
        assert_eq!(r.placeholder_count, 1);
        assert!(r
            .warnings
            .iter()
            .any(|w| matches!(w, ReconWarning::PlaceholdersUsed { count: 1 })));
    }

    #[test]
    fn with_duplication_shares_names_per_phone() {
        let records = vec![
            rec("235111"),
            rec("235222"),
            rec("235111"),
            rec("235111"),
            rec("235222"),
        ];
        let entries = vec![entry("TINA", Some("235111")), entry("ABAKAR", Some("235222"))];
        let r = resolve(&records, &entries, &mut NoCache);
        assert_eq!(r.strategy, MappingStrategy::WithDuplication);
        assert_eq!(r.names, vec!["TINA", "ABAKAR", "TINA", "TINA", "ABAKAR"]);
        assert!(r
            .warnings
            .iter()
            .any(|w| matches!(w, ReconWarning::AmbiguousMapping { .. })));
    }

    #[test]
    fn partial_recycles_by_index() {
        let records = vec![rec("1"), rec("2"), rec("3"), rec("4"), rec("5")];
        let entries = vec![entry("A", None), entry("B", None)];
        let r = resolve(&records, &entries, &mut NoCache);
        assert_eq!(r.strategy, MappingStrategy::Partial);
        // transaction 3 (0-indexed 2) -> beneficiary 2 mod 2 = 0
        assert_eq!(r.names, vec!["A", "B", "A", "B", "A"]);
    }

    #[test]
    fn fallback_tags_everything() {
        let records = vec![rec("235111"), rec("235222")];
        let r = resolve(&records, &[], &mut NoCache);
        assert_eq!(r.strategy, MappingStrategy::Fallback);
        assert_eq!(r.names, vec!["BENEFICIAIRE_1", "BENEFICIAIRE_2"]);
        assert!(r.warnings.contains(&ReconWarning::NoBeneficiaryData));
    }

    #[test]
    fn cache_fills_gap_left_by_missing_entry() {
        // Run 1: phone resolves from the table and lands in the cache.
        let mut cache = MemoryCache::new();
        let records = vec![rec("235111")];
        let entries = vec![
            entry("TINA", Some("235111")),
            entry("ABAKAR", Some("235222")),
        ];
        let r = resolve(&records, &entries, &mut cache);
        assert_eq!(r.names, vec!["TINA"]);

        // Run 2: the entry is gone; the cache answers instead.
        let entries = vec![entry("ABAKAR", Some("235222")), entry("X", Some("235333"))];
        let r = resolve(&records, &entries, &mut cache);
        assert_eq!(r.strategy, MappingStrategy::ByPhone);
        assert_eq!(r.names, vec!["TINA"]);
        assert_eq!(r.placeholder_count, 0);
    }

    #[test]
    fn conflicting_duplicate_phone_is_flagged() {
        let records = vec![rec("235111"), rec("235999")];
        let entries = vec![
            entry("TINA", Some("235111")),
            entry("NOT TINA", Some("235111")),
            entry("ABAKAR", Some("235222")),
        ];
        let r = resolve(&records, &entries, &mut NoCache);
        assert!(r
            .warnings
            .iter()
            .any(|w| matches!(w, ReconWarning::ConflictingDuplicate { phone } if phone == "235111")));
        // First entry wins
        assert_eq!(r.names[0], "TINA");
    }

    #[test]
    fn phone_normalization() {
        assert_eq!(normalize_phone(" +235 96 77 "), "2359677");
        assert_eq!(normalize_phone("23596771275"), "23596771275");
    }
}
