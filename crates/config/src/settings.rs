//! Runtime settings for the execution driver.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::{
    BurnVersion, DEFAULT_MIN_TX_FEE, DEFAULT_NATIVE_SYMBOL, MAX_BLOCK_RUN_STEP,
    MAX_CONTRACT_ARGUMENT_SIZE, MAX_CONTRACT_CODE_SIZE, MAX_OUTPUT_COUNT,
};

/// What the payer is charged when a run aborts after it started running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortFeePolicy {
    /// The transaction is rejected and nothing is charged.
    #[default]
    Reject,
    /// The fuel burned up to the abort point is charged at the fuel rate.
    ChargeConsumed,
}

/// Settings consumed by the execution driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Symbol of the ledger's native coin
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,

    /// Minimum transaction fee
    #[serde(default = "default_min_tx_fee")]
    pub min_tx_fee: u64,

    /// Cap on the fuel limit derived from a fee
    #[serde(default = "default_max_block_run_step")]
    pub max_block_run_step: u64,

    /// Maximum contract code size in bytes
    #[serde(default = "default_max_code_size")]
    pub max_code_size: usize,

    /// Exclusive upper bound on the argument blob size
    #[serde(default = "default_max_argument_size")]
    pub max_argument_size: usize,

    /// Maximum number of native-coin outputs per run
    #[serde(default = "default_max_output_count")]
    pub max_output_count: usize,

    /// Burner version runs are started with
    #[serde(default)]
    pub burn_version: BurnVersion,

    /// Fee policy for aborted runs
    #[serde(default)]
    pub abort_fee_policy: AbortFeePolicy,

    /// Emit receipts for committed runs
    #[serde(default = "default_contract_log_enabled")]
    pub contract_log_enabled: bool,
}

fn default_native_symbol() -> String {
    DEFAULT_NATIVE_SYMBOL.to_string()
}

fn default_min_tx_fee() -> u64 {
    DEFAULT_MIN_TX_FEE
}

fn default_max_block_run_step() -> u64 {
    MAX_BLOCK_RUN_STEP
}

fn default_max_code_size() -> usize {
    MAX_CONTRACT_CODE_SIZE
}

fn default_max_argument_size() -> usize {
    MAX_CONTRACT_ARGUMENT_SIZE
}

fn default_max_output_count() -> usize {
    MAX_OUTPUT_COUNT
}

fn default_contract_log_enabled() -> bool {
    true
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            native_symbol: default_native_symbol(),
            min_tx_fee: default_min_tx_fee(),
            max_block_run_step: default_max_block_run_step(),
            max_code_size: default_max_code_size(),
            max_argument_size: default_max_argument_size(),
            max_output_count: default_max_output_count(),
            burn_version: BurnVersion::NEWEST,
            abort_fee_policy: AbortFeePolicy::Reject,
            contract_log_enabled: default_contract_log_enabled(),
        }
    }
}

impl SandboxConfig {
    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: SandboxConfig =
            toml::from_str(content).map_err(|e| ConfigError::parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses settings from JSON text.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: SandboxConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads settings from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io(format!("{}: {e}", path.display())))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config = match extension.as_str() {
            "toml" => Self::from_toml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(ConfigError::unsupported_format(other)),
        };

        debug!(
            path = %path.display(),
            burn_version = %config.burn_version,
            max_block_run_step = config.max_block_run_step,
            "loaded sandbox configuration"
        );
        Ok(config)
    }

    /// Serializes the settings as pretty TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::parse(e.to_string()))
    }

    /// Rejects settings no run could execute under.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.native_symbol.is_empty() {
            return Err(ConfigError::invalid("native_symbol must not be empty"));
        }
        if self.max_block_run_step == 0 {
            return Err(ConfigError::invalid("max_block_run_step must be positive"));
        }
        if self.max_code_size == 0 {
            return Err(ConfigError::invalid("max_code_size must be positive"));
        }
        if self.max_argument_size == 0 {
            return Err(ConfigError::invalid("max_argument_size must be positive"));
        }
        if self.max_output_count == 0 {
            return Err(ConfigError::invalid("max_output_count must be positive"));
        }
        Ok(())
    }
}
