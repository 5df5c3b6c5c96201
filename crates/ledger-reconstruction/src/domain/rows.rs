//! # Ledger Rows
//!
//! Rows as the relational store hands them over. Entity ids stay in their
//! packed `i64` column form here; decoding happens when rows are projected
//! into read models, so a corrupt column surfaces as an internal error rather
//! than a panic.

use shared_types::{Timestamp, TokenType};

/// One record file, the unit that becomes a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFileRow {
    pub index: i64,
    /// Lowercase hex without prefix.
    pub hash: String,
    pub prev_hash: String,
    pub consensus_start: Timestamp,
    pub consensus_end: Timestamp,
}

/// Account (or other entity) state relevant to reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    pub id: i64,
    pub alias: Option<Vec<u8>>,
    /// Consensus timestamp of the deletion, if the entity was deleted.
    pub deleted_at: Option<Timestamp>,
}

/// Retroactive correction marker on a crypto transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errata {
    /// Row inserted after the fact; counts like any other row.
    Insert,
    /// Row retracted after the fact; must be ignored.
    Delete,
}

/// Raw hbar movement recorded for a transaction, fees included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoTransferRow {
    pub account_id: i64,
    pub amount: i64,
    pub errata: Option<Errata>,
}

impl CryptoTransferRow {
    /// Errata-deleted rows never contribute to balances or operations.
    pub fn is_effective(&self) -> bool {
        self.errata != Some(Errata::Delete)
    }
}

/// An hbar movement without fee semantics: itemized (non-fee) transfers from
/// the transaction body, and synthetic fee/reward legs built by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HbarTransfer {
    pub account_id: i64,
    pub amount: i64,
}

/// Fungible (or NFT count) token movement joined with its token definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferRow {
    pub account_id: i64,
    pub token_id: i64,
    pub amount: i64,
    pub decimals: u32,
    pub token_type: TokenType,
}

/// Movement of one NFT serial. Mints have no sender, burns and wipes no
/// receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftTransferRow {
    pub sender: Option<i64>,
    pub receiver: Option<i64>,
    pub serial_number: i64,
    pub token_id: i64,
}

/// A staking reward paid out as a side effect of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingRewardTransferRow {
    pub account_id: i64,
    pub amount: i64,
}

/// Token definition, attached to token create/update/delete transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    pub token_id: i64,
    pub decimals: u32,
    pub token_type: TokenType,
    pub freeze_default: bool,
    pub initial_supply: i64,
}

/// Latest association state of one (account, token) pair as of a query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAssociationRow {
    pub token_id: i64,
    pub associated: bool,
    /// When the state shown here took effect.
    pub timestamp: Timestamp,
    pub decimals: u32,
    pub token_type: TokenType,
}

/// Token balance of one account in a snapshot. For NFTs this is the count of
/// serials owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalanceRow {
    pub token_id: i64,
    pub balance: i64,
}

/// One transaction row together with every transfer it owns, produced by a
/// single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRow {
    pub consensus_timestamp: Timestamp,
    pub hash: Vec<u8>,
    pub transaction_type: i32,
    pub result: i32,
    pub payer_account_id: i64,
    pub entity_id: Option<i64>,
    pub memo: Vec<u8>,
    pub crypto_transfers: Vec<CryptoTransferRow>,
    pub itemized_transfers: Vec<HbarTransfer>,
    pub token_transfers: Vec<TokenTransferRow>,
    pub nft_transfers: Vec<NftTransferRow>,
    pub staking_reward_transfers: Vec<StakingRewardTransferRow>,
    pub token: Option<TokenRow>,
}

/// Historical token payload for one transaction, used to patch rows whose
/// live join lost transfers of since-deleted tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCorrection {
    pub consensus_timestamp: Timestamp,
    pub token_transfers: Vec<TokenTransferRow>,
    pub nft_transfers: Vec<NftTransferRow>,
}

/// One service endpoint of a node in an address book. Nodes without
/// endpoints appear once with `ip_address` empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBookEndpointRow {
    pub node_id: i64,
    pub node_account_id: i64,
    pub ip_address: String,
    pub port: i32,
}
