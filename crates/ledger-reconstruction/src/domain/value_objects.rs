//! # Value Objects
//!
//! Engine configuration.

use serde::{Deserialize, Serialize};
use shared_types::EntityId;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default rows fetched per page by the batched transaction scan.
pub const DEFAULT_BATCH_SIZE: usize = 2_000;

/// Default upper bound on a single request's store work.
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 20;

/// Longest statement timeout accepted: one day.
pub const MAX_STATEMENT_TIMEOUT_SECS: u64 = 86_400;

/// Default staking reward payer `0.0.800`.
pub const DEFAULT_STAKING_REWARD_ACCOUNT: i64 = 800;

/// Primary address book file `0.0.101`.
pub const DEFAULT_ADDRESS_BOOK_FILE: i64 = 101;

/// Fallback address book file `0.0.102`.
pub const DEFAULT_ADDRESS_BOOK_FALLBACK_FILE: i64 = 102;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,

    #[error("statement timeout must be greater than zero")]
    ZeroStatementTimeout,

    #[error("statement timeout of {0}s exceeds the 86400s limit")]
    StatementTimeoutTooLong(u64),

    #[error("address book file and fallback file are both {0}")]
    DuplicateAddressBookFile(EntityId),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Tunables of the reconstruction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Rows per page in the batched transaction scan.
    pub batch_size: usize,
    /// Store budget of one request, capped further by the caller's deadline.
    pub statement_timeout_secs: u64,
    /// Account that pays out staking rewards.
    pub staking_reward_account: EntityId,
    pub address_book_file: EntityId,
    pub address_book_fallback_file: EntityId,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            statement_timeout_secs: DEFAULT_STATEMENT_TIMEOUT_SECS,
            staking_reward_account: system_entity(DEFAULT_STAKING_REWARD_ACCOUNT),
            address_book_file: system_entity(DEFAULT_ADDRESS_BOOK_FILE),
            address_book_fallback_file: system_entity(DEFAULT_ADDRESS_BOOK_FALLBACK_FILE),
        }
    }
}

// System entities live in shard 0 realm 0 and are far below the number limit.
fn system_entity(number: i64) -> EntityId {
    EntityId::of_num(number).unwrap_or_default()
}

impl LedgerConfig {
    /// Build the configuration from the environment, falling back to the
    /// defaults for unset variables.
    ///
    /// # Environment Variables
    ///
    /// - `MIRROR_BATCH_SIZE`
    /// - `MIRROR_STATEMENT_TIMEOUT_SECS`
    /// - `MIRROR_STAKING_REWARD_ACCOUNT` (`shard.realm.num`)
    /// - `MIRROR_ADDRESS_BOOK_FILE` (`shard.realm.num`)
    /// - `MIRROR_ADDRESS_BOOK_FALLBACK_FILE` (`shard.realm.num`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            batch_size: env_or("MIRROR_BATCH_SIZE", defaults.batch_size)?,
            statement_timeout_secs: env_or(
                "MIRROR_STATEMENT_TIMEOUT_SECS",
                defaults.statement_timeout_secs,
            )?,
            staking_reward_account: env_or(
                "MIRROR_STAKING_REWARD_ACCOUNT",
                defaults.staking_reward_account,
            )?,
            address_book_file: env_or("MIRROR_ADDRESS_BOOK_FILE", defaults.address_book_file)?,
            address_book_fallback_file: env_or(
                "MIRROR_ADDRESS_BOOK_FALLBACK_FILE",
                defaults.address_book_fallback_file,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.statement_timeout_secs == 0 {
            return Err(ConfigError::ZeroStatementTimeout);
        }
        if self.statement_timeout_secs > MAX_STATEMENT_TIMEOUT_SECS {
            return Err(ConfigError::StatementTimeoutTooLong(
                self.statement_timeout_secs,
            ));
        }
        if self.address_book_file == self.address_book_fallback_file {
            return Err(ConfigError::DuplicateAddressBookFile(
                self.address_book_file,
            ));
        }
        Ok(())
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

fn env_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 2_000);
        assert_eq!(config.statement_timeout(), Duration::from_secs(20));
        assert_eq!(config.staking_reward_account.to_string(), "0.0.800");
        assert_eq!(config.address_book_file.to_string(), "0.0.101");
        assert_eq!(config.address_book_fallback_file.to_string(), "0.0.102");
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = LedgerConfig {
            batch_size: 0,
            ..LedgerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBatchSize));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = LedgerConfig {
            statement_timeout_secs: 0,
            ..LedgerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroStatementTimeout));
    }

    #[test]
    fn test_validate_rejects_timeout_above_ceiling() {
        let config = LedgerConfig {
            statement_timeout_secs: u64::MAX,
            ..LedgerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::StatementTimeoutTooLong(u64::MAX))
        );

        let config = LedgerConfig {
            statement_timeout_secs: MAX_STATEMENT_TIMEOUT_SECS,
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_same_address_book_files() {
        let config = LedgerConfig {
            address_book_fallback_file: system_entity(101),
            ..LedgerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateAddressBookFile(_))
        ));
    }

    #[test]
    fn test_config_serializes_entity_ids_as_strings() {
        let json = serde_json::to_value(LedgerConfig::default()).unwrap();
        assert_eq!(json["staking_reward_account"], "0.0.800");
    }
}
