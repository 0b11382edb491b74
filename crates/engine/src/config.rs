use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine configuration. Every field has a default, so an empty TOML
/// document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub name: String,
    /// Fallback fee rate when the fee table gives no answer.
    pub default_fee_rate: f64,
    /// Value of the ledger's "De" column.
    pub sender_label: String,
    /// Value of the ledger's "Type" column.
    pub transaction_kind: String,
    /// Minimum field count to accept a line from the split parse path.
    pub min_fields_split: usize,
    /// Minimum field count to accept a line from the quoted parse path.
    pub min_fields_regex: usize,
    /// Preamble line count assumed when no header marker is found.
    pub header_fallback_offset: usize,
    /// Total-fee share of total amount that triggers the high-fee warning.
    pub fee_ratio_alert: f64,
    pub cache: CacheConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "payrec".into(),
            default_fee_rate: 0.0168,
            sender_label: "UGP".into(),
            transaction_kind: "PAIEMENT".into(),
            min_fields_split: 8,
            min_fields_regex: 12,
            header_fallback_offset: 12,
            fee_ratio_alert: 0.10,
            cache: CacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache file path; the CLI resolves a platform default when unset.
    pub file: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, file: None }
    }
}

impl EngineConfig {
    pub fn from_toml(s: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            toml::from_str(s).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..1.0).contains(&self.default_fee_rate) {
            return Err(EngineError::ConfigValidation(format!(
                "default_fee_rate must be in [0, 1), got {}",
                self.default_fee_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.fee_ratio_alert) {
            return Err(EngineError::ConfigValidation(format!(
                "fee_ratio_alert must be in [0, 1], got {}",
                self.fee_ratio_alert
            )));
        }
        if self.min_fields_split == 0 || self.min_fields_regex == 0 {
            return Err(EngineError::ConfigValidation(
                "field minimums must be at least 1".into(),
            ));
        }
        if self.min_fields_regex < self.min_fields_split {
            return Err(EngineError::ConfigValidation(
                "min_fields_regex must be >= min_fields_split".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_valid() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config.default_fee_rate, 0.0168);
        assert_eq!(config.sender_label, "UGP");
        assert_eq!(config.transaction_kind, "PAIEMENT");
        assert!(config.cache.enabled);
    }

    #[test]
    fn overrides_apply() {
        let toml = r#"
name = "ugp-monthly"
default_fee_rate = 0.02
sender_label = "ONG"

[cache]
enabled = false
"#;
        let config = EngineConfig::from_toml(toml).unwrap();
        assert_eq!(config.name, "ugp-monthly");
        assert_eq!(config.default_fee_rate, 0.02);
        assert_eq!(config.sender_label, "ONG");
        assert!(!config.cache.enabled);
    }

    #[test]
    fn bad_rate_rejected() {
        let err = EngineConfig::from_toml("default_fee_rate = 1.5").unwrap_err();
        assert!(matches!(err, EngineError::ConfigValidation(_)));
    }

    #[test]
    fn regex_minimum_below_split_rejected() {
        let err =
            EngineConfig::from_toml("min_fields_split = 10\nmin_fields_regex = 8").unwrap_err();
        assert!(matches!(err, EngineError::ConfigValidation(_)));
    }
}
