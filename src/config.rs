use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::account::BankDetails;
use crate::fee::{DEFAULT_EXTERNAL_MINIMUM, DEFAULT_EXTERNAL_RATE, FeePolicy};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    /// hourly | daily | never
    pub rotation: String,
    pub enable_tracing: bool,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; in-memory ledger when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Home bank stamped on every account opened here
    #[serde(default)]
    pub bank: BankConfig,
    #[serde(default)]
    pub fees: FeeConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BankConfig {
    pub bank_name: String,
    #[serde(default)]
    pub ifsc_code: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            bank_name: "Ledger Bank".to_string(),
            ifsc_code: None,
            branch_name: None,
        }
    }
}

impl BankConfig {
    pub fn to_details(&self) -> BankDetails {
        BankDetails {
            bank_name: self.bank_name.clone(),
            ifsc_code: self.ifsc_code.clone(),
            branch_name: self.branch_name.clone(),
        }
    }
}

/// External transfer pricing
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct FeeConfig {
    pub external_rate: Decimal,
    pub external_minimum: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            external_rate: DEFAULT_EXTERNAL_RATE,
            external_minimum: DEFAULT_EXTERNAL_MINIMUM,
        }
    }
}

impl FeeConfig {
    pub fn to_policy(&self) -> FeePolicy {
        FeePolicy {
            external_rate: self.external_rate,
            external_minimum: self.external_minimum,
        }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.jwt_secret.trim().is_empty(), "jwt_secret must be set");
        anyhow::ensure!(
            self.fees.external_rate >= Decimal::ZERO && self.fees.external_minimum >= Decimal::ZERO,
            "fees must not be negative"
        );
        anyhow::ensure!(
            !self.bank.bank_name.trim().is_empty(),
            "bank.bank_name must be set"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: ledger.log
use_json: false
rotation: daily
enable_tracing: true
gateway:
  host: 127.0.0.1
  port: 8080
jwt_secret: change-me
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert!(config.postgres_url.is_none());
        assert_eq!(config.fees.to_policy(), FeePolicy::default());
        assert_eq!(config.bank.to_details().bank_name, "Ledger Bank");
    }

    #[test]
    fn test_overrides() {
        let yaml = format!(
            "{}postgres_url: postgresql://localhost/ledger\nbank:\n  bank_name: First Bank\n  ifsc_code: FBNK0001\nfees:\n  external_rate: 0.01\n  external_minimum: 5\n",
            MINIMAL
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(
            config.postgres_url.as_deref(),
            Some("postgresql://localhost/ledger")
        );
        assert_eq!(config.bank.ifsc_code.as_deref(), Some("FBNK0001"));
        assert_eq!(config.fees.external_rate, Decimal::from_str("0.01").unwrap());
        assert_eq!(config.fees.external_minimum, Decimal::from(5));
    }

    #[test]
    fn test_rejects_empty_secret() {
        let yaml = MINIMAL.replace("jwt_secret: change-me", "jwt_secret: \"\"");
        assert!(AppConfig::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_rejects_missing_gateway() {
        let yaml = MINIMAL.replace("gateway:\n  host: 127.0.0.1\n  port: 8080\n", "");
        assert!(AppConfig::from_yaml(&yaml).is_err());
    }
}
