//! # Read-Model Entities
//!
//! The account-model view of the ledger handed to the API layer.
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `Transaction`, `Operation`
//! - **Accounts**: `AccountId`, `AccountBalance`, `Amount`
//! - **Network**: `AddressBookEntry`
//!
//! Everything here is recomputed per request from committed ledger rows and
//! is never written back.

use crate::entity_id::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consensus timestamp in nanoseconds since the epoch.
pub type Timestamp = i64;

/// Render bytes the way the API layer expects hashes and aliases.
pub fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// An account, addressed by entity id, alias, or both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId {
    pub entity_id: Option<EntityId>,
    pub alias: Option<Vec<u8>>,
}

impl AccountId {
    pub fn from_entity(entity_id: EntityId) -> Self {
        Self {
            entity_id: Some(entity_id),
            alias: None,
        }
    }

    pub fn from_alias(alias: Vec<u8>) -> Self {
        Self {
            entity_id: None,
            alias: Some(alias),
        }
    }

    /// True when only the alias is known and a directory lookup is required.
    pub fn is_alias_only(&self) -> bool {
        self.entity_id.is_none() && self.alias.is_some()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.entity_id, &self.alias) {
            (Some(id), _) => write!(f, "{}", id),
            (None, Some(alias)) => write!(f, "{}", to_prefixed_hex(alias)),
            (None, None) => write!(f, "<unknown>"),
        }
    }
}

/// A block of the account-model view.
///
/// The genesis block is self-referential: its parent index and hash are its
/// own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: i64,
    pub hash: String,
    pub parent_index: i64,
    pub parent_hash: String,
    pub consensus_start: Timestamp,
    pub consensus_end: Timestamp,
}

impl Block {
    pub fn is_self_referential(&self) -> bool {
        self.parent_index == self.index && self.parent_hash == self.hash
    }
}

/// Fungibility class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    FungibleCommon,
    NonFungibleUnique,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::FungibleCommon => "FUNGIBLE_COMMON",
            TokenType::NonFungibleUnique => "NON_FUNGIBLE_UNIQUE",
        }
    }
}

/// Hbar amount in tinybars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HbarAmount {
    pub value: i64,
}

/// Token amount. For non-fungible tokens `value` counts units and the
/// serial numbers moved are listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub token_id: EntityId,
    pub decimals: u32,
    pub token_type: TokenType,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub serial_numbers: Vec<i64>,
}

/// A signed balance or balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "currency", rename_all = "snake_case")]
pub enum Amount {
    Hbar(HbarAmount),
    Token(TokenAmount),
}

impl Amount {
    pub fn hbar(value: i64) -> Self {
        Amount::Hbar(HbarAmount { value })
    }

    pub fn value(&self) -> i64 {
        match self {
            Amount::Hbar(amount) => amount.value,
            Amount::Token(amount) => amount.value,
        }
    }

    pub fn token_id(&self) -> Option<EntityId> {
        match self {
            Amount::Hbar(_) => None,
            Amount::Token(amount) => Some(amount.token_id),
        }
    }
}

/// The atomic unit of balance change within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Position within the owning transaction, contiguous from zero.
    pub index: i64,
    #[serde(rename = "type")]
    pub operation_type: String,
    pub status: String,
    pub account_id: EntityId,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A logical transaction, merged from every row sharing its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    pub memo: Vec<u8>,
    pub operations: Vec<Operation>,
}

/// Point-in-time balances of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Canonical `shard.realm.num` of the account, or the alias string when
    /// the alias never resolved to an entity.
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Hbar first, then tokens ordered by token id.
    pub amounts: Vec<Amount>,
}

impl AccountBalance {
    /// Balances of `account`, labelled by its canonical form and its alias
    /// when one is known.
    pub fn new(account: &AccountId, amounts: Vec<Amount>) -> Self {
        Self {
            account_id: account.to_string(),
            alias: account.alias.as_deref().map(to_prefixed_hex),
            amounts,
        }
    }
}

/// A consensus node and its service endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookEntry {
    pub node_id: i64,
    pub account_id: EntityId,
    /// `ip:port` strings.
    pub endpoints: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_display() {
        let id = AccountId::from_entity(EntityId::of_num(1001).unwrap());
        assert_eq!(id.to_string(), "0.0.1001");

        let alias = AccountId::from_alias(vec![0xab, 0xcd]);
        assert!(alias.is_alias_only());
        assert_eq!(alias.to_string(), "0xabcd");
    }

    #[test]
    fn test_account_balance_labels() {
        let resolved = AccountId {
            entity_id: Some(EntityId::of_num(1001).unwrap()),
            alias: Some(vec![0x12, 0x34]),
        };
        let balance = AccountBalance::new(&resolved, vec![Amount::hbar(5)]);
        assert_eq!(balance.account_id, "0.0.1001");
        assert_eq!(balance.alias.as_deref(), Some("0x1234"));

        let unresolved = AccountId::from_alias(vec![0xab]);
        let balance = AccountBalance::new(&unresolved, vec![Amount::hbar(0)]);
        assert_eq!(balance.account_id, "0xab");
        assert_eq!(balance.alias.as_deref(), Some("0xab"));

        let plain = AccountBalance::new(
            &AccountId::from_entity(EntityId::of_num(7).unwrap()),
            vec![],
        );
        let json = serde_json::to_value(&plain).unwrap();
        assert!(json.get("alias").is_none());
    }

    #[test]
    fn test_amount_serialization_tags_currency() {
        let json = serde_json::to_value(Amount::hbar(10)).unwrap();
        assert_eq!(json["currency"], "hbar");
        assert_eq!(json["value"], 10);

        let token = Amount::Token(TokenAmount {
            token_id: EntityId::of_num(2000).unwrap(),
            decimals: 2,
            token_type: TokenType::FungibleCommon,
            value: -5,
            serial_numbers: vec![],
        });
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["currency"], "token");
        assert_eq!(json["token_id"], "0.0.2000");
        assert_eq!(json["token_type"], "FUNGIBLE_COMMON");
        assert!(json.get("serial_numbers").is_none());
    }

    #[test]
    fn test_genesis_block_is_self_referential() {
        let block = Block {
            index: 5,
            hash: "0xaa".into(),
            parent_index: 5,
            parent_hash: "0xaa".into(),
            consensus_start: 10,
            consensus_end: 20,
        };
        assert!(block.is_self_referential());
    }
}
