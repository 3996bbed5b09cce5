//! Configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every section and
//! field has a default, so an empty or missing file yields a usable config.

use crate::account::AccountAddress;
use crate::amount::{DECIMALS, TokenAmount};
use crate::error::{FtgpError, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_LEDGER_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const DEFAULT_DEV_ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct FtgpConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub loan: LoanConfig,
    #[serde(default)]
    pub dev_ledger: DevLedgerConfig,
}

/// Where the ledger lives. This is the only source of the ledger address.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_address")]
    pub address: AccountAddress,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    /// Upper bound on deposit indices probed during a refresh.
    #[serde(default = "default_max_deposit_probe")]
    pub max_deposit_probe: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoanConfig {
    #[serde(default = "default_eth_usd_price")]
    pub eth_usd_price: f64,
    #[serde(default = "default_loan_to_value")]
    pub loan_to_value: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DevLedgerConfig {
    #[serde(default = "default_dev_account")]
    pub account: AccountAddress,
    #[serde(default = "default_opening_balance")]
    pub opening_balance: TokenAmount,
    #[serde(default)]
    pub confirmation_delay_ms: u64,
}

fn default_decimals() -> u32 {
    DECIMALS
}

fn default_max_deposit_probe() -> u64 {
    100
}

fn default_eth_usd_price() -> f64 {
    1000.0
}

fn default_loan_to_value() -> f64 {
    0.4
}

fn default_opening_balance() -> TokenAmount {
    TokenAmount::from_whole(1000)
}

fn fixed_address(text: &str) -> AccountAddress {
    AccountAddress::from_trusted(text)
}

fn default_ledger_address() -> AccountAddress {
    fixed_address(DEFAULT_LEDGER_ADDRESS)
}

fn default_dev_account() -> AccountAddress {
    fixed_address(DEFAULT_DEV_ACCOUNT)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            address: default_ledger_address(),
            decimals: default_decimals(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_deposit_probe: default_max_deposit_probe(),
        }
    }
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            eth_usd_price: default_eth_usd_price(),
            loan_to_value: default_loan_to_value(),
        }
    }
}

impl Default for DevLedgerConfig {
    fn default() -> Self {
        Self {
            account: default_dev_account(),
            opening_balance: default_opening_balance(),
            confirmation_delay_ms: 0,
        }
    }
}

impl FtgpConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FtgpConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.ledger.decimals != DECIMALS {
            return Err(FtgpError::config(format!(
                "ledger.decimals must be {}, got {}",
                DECIMALS, self.ledger.decimals
            )));
        }
        if self.workflow.max_deposit_probe == 0 {
            return Err(FtgpError::config("workflow.max_deposit_probe must be positive"));
        }
        if !(self.loan.eth_usd_price > 0.0) {
            return Err(FtgpError::config("loan.eth_usd_price must be positive"));
        }
        if !(self.loan.loan_to_value > 0.0 && self.loan.loan_to_value <= 1.0) {
            return Err(FtgpError::config("loan.loan_to_value must be in (0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = FtgpConfig::from_toml_str("").unwrap();
        assert_eq!(config, FtgpConfig::default());
        assert_eq!(config.workflow.max_deposit_probe, 100);
        assert_eq!(config.loan.loan_to_value, 0.4);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config = FtgpConfig::from_toml_str(
            r#"
            [ledger]
            address = "0x0000000000000000000000000000000000000abc"

            [dev_ledger]
            account = "0x0000000000000000000000000000000000000001"
            confirmation_delay_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(
            config.ledger.address.as_str(),
            "0x0000000000000000000000000000000000000abc"
        );
        assert_eq!(config.ledger.decimals, 18);
        assert_eq!(config.dev_ledger.confirmation_delay_ms, 250);
        assert_eq!(config.dev_ledger.opening_balance, TokenAmount::from_whole(1000));
    }

    #[test]
    fn test_sections_without_addresses_use_default_addresses() {
        let ledger = FtgpConfig::from_toml_str("[ledger]\ndecimals = 18\n").unwrap();
        assert_eq!(ledger.ledger.address, LedgerConfig::default().address);

        let dev = FtgpConfig::from_toml_str("[dev_ledger]\nconfirmation_delay_ms = 250\n").unwrap();
        assert_eq!(dev.dev_ledger.account, DevLedgerConfig::default().account);
        assert_eq!(dev.dev_ledger.confirmation_delay_ms, 250);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(FtgpConfig::from_toml_str("[ledger]\naddress = \"nope\"").is_err());
        assert!(FtgpConfig::from_toml_str("[workflow]\nmax_deposit_probe = 0").is_err());
        assert!(FtgpConfig::from_toml_str("[loan]\nloan_to_value = 1.5").is_err());

        let mut config = FtgpConfig::default();
        config.ledger.decimals = 6;
        assert!(matches!(config.validate(), Err(FtgpError::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = FtgpConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(FtgpConfig::from_toml_str(&text).unwrap(), config);
    }
}
