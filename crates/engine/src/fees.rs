//! Fee derivation from an optional lookup table.

use payrec_core::{BandFee, FeeRule, Grid};

/// Amount tolerance for an exact-rule hit (amounts carry two decimals).
const EXACT_EPSILON: f64 = 0.005;

/// A near hit within this share of the amount scales the matched fee.
const NEAR_MATCH_RATIO: f64 = 0.1;

const AMOUNT_TOKENS: [&str; 2] = ["montant", "amount"];
const FEE_TOKENS: [&str; 2] = ["frais", "fee"];
const RATE_TOKENS: [&str; 2] = ["taux", "rate"];

#[derive(Debug, Clone, Default)]
pub struct FeeTable {
    rules: Vec<FeeRule>,
    /// Mean of fee/amount over exact rules with a positive amount.
    average_rate: Option<f64>,
}

impl FeeTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[FeeRule] {
        &self.rules
    }

    /// Build from a two-column grid (amount, fee), header or header-less.
    /// A grid with `min`/`max` headers yields banded rules instead.
    ///
    /// Rows that fail numeric coercion are skipped, which is also what
    /// absorbs a header row in the positional layout. An unusable grid
    /// produces an empty table; the caller decides whether that warrants
    /// a warning.
    pub fn from_grid(grid: &Grid) -> Self {
        if let Some(table) = banded_from_grid(grid) {
            return table;
        }

        let (amount_col, fee_col, data_start) = match exact_header_columns(grid) {
            Some((a, f)) => (a, f, 1),
            None => (0, 1, 0),
        };

        let mut rules = Vec::new();
        for row in data_start..grid.height() {
            let (Some(amount), Some(fee)) = (
                parse_number(grid.cell(row, amount_col)),
                parse_number(grid.cell(row, fee_col)),
            ) else {
                continue;
            };
            rules.push(FeeRule::Exact { amount, fee });
        }

        Self::from_rules(rules)
    }

    pub fn from_rules(rules: Vec<FeeRule>) -> Self {
        let rates: Vec<f64> = rules
            .iter()
            .filter_map(|r| match r {
                FeeRule::Exact { amount, fee } if *amount > 0.0 => Some(fee / amount),
                _ => None,
            })
            .collect();
        let average_rate = (!rates.is_empty())
            .then(|| rates.iter().sum::<f64>() / rates.len() as f64);

        Self { rules, average_rate }
    }

    /// The fee for one amount, whole currency units, never negative.
    ///
    /// Ladder: exact hit, banded hit, near hit scaled by the amount
    /// ratio, table average rate, configured default rate.
    pub fn fee_for(&self, amount: f64, default_rate: f64) -> i64 {
        if let Some(fee) = self.exact_hit(amount) {
            return round_fee(fee);
        }
        if let Some(fee) = self.banded_hit(amount) {
            return round_fee(fee);
        }
        if let Some(fee) = self.near_hit(amount) {
            return round_fee(fee);
        }
        if let Some(rate) = self.average_rate {
            return round_fee(amount * rate);
        }
        round_fee(amount * default_rate)
    }

    fn exact_hit(&self, amount: f64) -> Option<f64> {
        self.rules.iter().find_map(|r| match r {
            FeeRule::Exact { amount: a, fee } if (a - amount).abs() < EXACT_EPSILON => Some(*fee),
            _ => None,
        })
    }

    fn banded_hit(&self, amount: f64) -> Option<f64> {
        self.rules.iter().find_map(|r| match r {
            FeeRule::Banded { min_amount, max_amount, fee }
                if *min_amount <= amount && amount <= *max_amount =>
            {
                Some(match fee {
                    BandFee::Amount(f) => *f,
                    BandFee::Rate(rate) => amount * rate,
                })
            }
            _ => None,
        })
    }

    /// Closest exact rule within ±10% of the amount, its fee scaled by
    /// the amount ratio.
    fn near_hit(&self, amount: f64) -> Option<f64> {
        let (rule_amount, rule_fee) = self
            .rules
            .iter()
            .filter_map(|r| match r {
                FeeRule::Exact { amount: a, fee } if *a > 0.0 => Some((*a, *fee)),
                _ => None,
            })
            .min_by(|(a, _), (b, _)| {
                (a - amount).abs().partial_cmp(&(b - amount).abs()).expect("finite amounts")
            })?;

        ((rule_amount - amount).abs() < amount * NEAR_MATCH_RATIO)
            .then(|| amount * (rule_fee / rule_amount))
    }
}

fn round_fee(fee: f64) -> i64 {
    fee.max(0.0).round() as i64
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Locate amount/fee columns by header text on the first row.
fn exact_header_columns(grid: &Grid) -> Option<(usize, usize)> {
    if grid.height() == 0 {
        return None;
    }
    let headers: Vec<String> = (0..grid.width())
        .map(|c| grid.cell(0, c).to_lowercase())
        .collect();

    let amount_col = headers
        .iter()
        .position(|h| AMOUNT_TOKENS.iter().any(|t| h.contains(t)))?;
    let fee_col = headers
        .iter()
        .enumerate()
        .find(|(i, h)| *i != amount_col && FEE_TOKENS.iter().any(|t| h.contains(t)))
        .map(|(i, _)| i)?;
    Some((amount_col, fee_col))
}

/// Banded layout: `min` and `max` headers plus a fee or rate column.
fn banded_from_grid(grid: &Grid) -> Option<FeeTable> {
    if grid.height() < 2 {
        return None;
    }
    let headers: Vec<String> = (0..grid.width())
        .map(|c| grid.cell(0, c).to_lowercase())
        .collect();

    let min_col = headers.iter().position(|h| h.contains("min"))?;
    let max_col = headers.iter().position(|h| h.contains("max"))?;
    let fee_col = headers
        .iter()
        .position(|h| FEE_TOKENS.iter().any(|t| h.contains(t)));
    let rate_col = headers
        .iter()
        .position(|h| RATE_TOKENS.iter().any(|t| h.contains(t)));
    if fee_col.is_none() && rate_col.is_none() {
        return None;
    }

    let mut rules = Vec::new();
    for row in 1..grid.height() {
        let (Some(min_amount), Some(max_amount)) = (
            parse_number(grid.cell(row, min_col)),
            parse_number(grid.cell(row, max_col)),
        ) else {
            continue;
        };

        let fee = fee_col
            .and_then(|c| parse_number(grid.cell(row, c)))
            .map(BandFee::Amount)
            .or_else(|| rate_col.and_then(|c| parse_number(grid.cell(row, c))).map(BandFee::Rate));
        let Some(fee) = fee else { continue };

        rules.push(FeeRule::Banded { min_amount, max_amount, fee });
    }

    if rules.is_empty() {
        return None;
    }
    Some(FeeTable::from_rules(rules))
}
