//! # Inbound Ports (Driving Ports)
//!
//! The API the engine exposes to a Rosetta-style front end.

use async_trait::async_trait;
use shared_types::{
    AccountBalance, AccountId, AddressBookEntry, Block, EntityId, LedgerError, Timestamp,
    Transaction,
};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;

/// Per-request context. The deadline bounds every store call the request
/// makes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context without a caller deadline; only the statement timeout
    /// applies.
    pub fn background() -> Self {
        Self { deadline: None }
    }

    /// A timeout past the clock's range means no caller deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// How a caller identifies a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSelector {
    Index(i64),
    Hash(String),
    /// Both given; they must agree.
    IndexAndHash(i64, String),
    Latest,
    Genesis,
}

impl BlockSelector {
    /// Build a selector from an optional index and hash. Neither means the
    /// latest block.
    pub fn from_parts(index: Option<i64>, hash: Option<&str>) -> Self {
        match (index, hash) {
            (Some(index), Some(hash)) => BlockSelector::IndexAndHash(index, hash.to_string()),
            (Some(index), None) => BlockSelector::Index(index),
            (None, Some(hash)) => BlockSelector::Hash(hash.to_string()),
            (None, None) => BlockSelector::Latest,
        }
    }
}

/// How a caller identifies an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountSelector {
    Id(EntityId),
    /// Raw alias bytes (public key or EVM address).
    Alias(Vec<u8>),
}

impl AccountSelector {
    /// The account as far as the selector alone identifies it.
    pub fn account_id(&self) -> AccountId {
        match self {
            AccountSelector::Id(id) => AccountId::from_entity(*id),
            AccountSelector::Alias(alias) => AccountId::from_alias(alias.clone()),
        }
    }
}

impl FromStr for AccountSelector {
    type Err = LedgerError;

    /// `shard.realm.num` or a `0x`-prefixed hex alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "account must not be empty".to_string(),
            ));
        }
        if let Some(alias) = trimmed.strip_prefix("0x") {
            let bytes = hex::decode(alias).map_err(|e| {
                LedgerError::InvalidArgument(format!("invalid account alias {:?}: {}", s, e))
            })?;
            if bytes.is_empty() {
                return Err(LedgerError::InvalidArgument(
                    "account alias must not be empty".to_string(),
                ));
            }
            return Ok(AccountSelector::Alias(bytes));
        }
        trimmed
            .parse::<EntityId>()
            .map(AccountSelector::Id)
            .map_err(|e| LedgerError::InvalidArgument(e.to_string()))
    }
}

/// Point-in-time ledger queries.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn resolve_block(
        &self,
        ctx: &RequestContext,
        selector: BlockSelector,
    ) -> Result<Block, LedgerError>;

    /// Balances of the account as of `consensus_timestamp`, inclusive.
    async fn get_balance(
        &self,
        ctx: &RequestContext,
        account: &AccountSelector,
        consensus_timestamp: Timestamp,
    ) -> Result<AccountBalance, LedgerError>;

    /// Balances at the end of the selected block.
    async fn get_balance_at_block(
        &self,
        ctx: &RequestContext,
        account: &AccountSelector,
        selector: BlockSelector,
    ) -> Result<(Block, AccountBalance), LedgerError>;

    /// Transactions with `start <= ts <= end`.
    async fn get_transactions_in_range(
        &self,
        ctx: &RequestContext,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// The transaction with the hash inside the block's consensus range.
    async fn get_transaction_by_hash(
        &self,
        ctx: &RequestContext,
        hash: &str,
        block_start: Timestamp,
        block_end: Timestamp,
    ) -> Result<Transaction, LedgerError>;

    /// The selected block and every transaction inside it.
    async fn get_block_transactions(
        &self,
        ctx: &RequestContext,
        selector: BlockSelector,
    ) -> Result<(Block, Vec<Transaction>), LedgerError>;

    /// Current consensus nodes.
    async fn address_book(&self, ctx: &RequestContext) -> Result<Vec<AddressBookEntry>, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ErrorKind;

    #[test]
    fn test_block_selector_from_parts() {
        assert_eq!(BlockSelector::from_parts(None, None), BlockSelector::Latest);
        assert_eq!(BlockSelector::from_parts(Some(3), None), BlockSelector::Index(3));
        assert_eq!(
            BlockSelector::from_parts(Some(3), Some("0xab")),
            BlockSelector::IndexAndHash(3, "0xab".to_string())
        );
    }

    #[test]
    fn test_account_selector_parsing() {
        assert_eq!(
            "0.0.1001".parse::<AccountSelector>().unwrap(),
            AccountSelector::Id(EntityId::of_num(1001).unwrap())
        );
        assert_eq!(
            "0xabcd".parse::<AccountSelector>().unwrap(),
            AccountSelector::Alias(vec![0xab, 0xcd])
        );
        for bad in ["", "0x", "0xzz", "1.2", "a.b.c"] {
            let err = bad.parse::<AccountSelector>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "input {:?}", bad);
        }
    }

    #[test]
    fn test_selector_account_id() {
        let by_id: AccountSelector = "0.0.1001".parse().unwrap();
        let account = by_id.account_id();
        assert_eq!(account.entity_id, Some(EntityId::of_num(1001).unwrap()));
        assert!(!account.is_alias_only());

        let by_alias: AccountSelector = "0xabcd".parse().unwrap();
        let account = by_alias.account_id();
        assert!(account.is_alias_only());
        assert_eq!(account.to_string(), "0xabcd");
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_deadline() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(5));
        let deadline = ctx.deadline().unwrap();
        assert_eq!(deadline - Instant::now(), Duration::from_secs(5));
        assert!(RequestContext::background().deadline().is_none());
        assert!(RequestContext::with_timeout(Duration::MAX).deadline().is_none());
    }
}
