//! # Balance Reconstruction
//!
//! A balance at time `t` is the latest snapshot at or before `t` plus every
//! committed delta strictly after the snapshot up to `t`.
//!
//! ## Deletion Pinning
//!
//! A deleted account is frozen at its deletion: the deletion transaction's
//! own sweep still applies, later rows do not, and the snapshot must predate
//! the deletion.
//!
//! ## Dissociation
//!
//! A token dissociated after the snapshot was taken still has a snapshot
//! balance that no longer applies, so it is reported as an explicit zero.
//! A token dissociated before the snapshot never appears.

use shared_types::{Amount, EntityId, EntityIdError, Timestamp, TokenAmount, TokenType};
use std::collections::HashMap;

use super::rows::{
    CryptoTransferRow, EntityRow, NftTransferRow, TokenAssociationRow, TokenBalanceRow,
    TokenTransferRow,
};

/// Time bounds of one balance query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceWindow {
    /// Deltas are summed up to and including this timestamp.
    pub balance_change_end: Timestamp,
    /// The snapshot must be taken at or before this timestamp.
    pub snapshot_end: Timestamp,
}

impl BalanceWindow {
    pub fn for_entity(entity: Option<&EntityRow>, consensus_end: Timestamp) -> Self {
        match entity.and_then(|e| e.deleted_at) {
            Some(deleted_at) if deleted_at <= consensus_end => Self {
                balance_change_end: deleted_at,
                snapshot_end: deleted_at - 1,
            },
            _ => Self {
                balance_change_end: consensus_end,
                snapshot_end: consensus_end,
            },
        }
    }
}

/// Net hbar movement of the rows, ignoring errata-deleted ones.
pub fn sum_hbar_deltas(transfers: &[CryptoTransferRow]) -> i64 {
    transfers
        .iter()
        .filter(|t| t.is_effective())
        .map(|t| t.amount)
        .sum()
}

/// Net NFT count change of `account` over the movements.
pub fn net_nft_count(account: i64, transfers: &[NftTransferRow]) -> HashMap<i64, i64> {
    let mut net = HashMap::new();
    for transfer in transfers {
        for leg in transfer.split() {
            if leg.account_id == account {
                *net.entry(leg.token_id).or_insert(0) += leg.delta();
            }
        }
    }
    net
}

/// Inputs of the token side of a balance query.
#[derive(Debug, Default)]
pub struct TokenLedger<'a> {
    pub account: i64,
    pub snapshot_timestamp: Timestamp,
    pub associations: &'a [TokenAssociationRow],
    pub snapshot_balances: &'a [TokenBalanceRow],
    pub token_transfers: &'a [TokenTransferRow],
    pub nft_transfers: &'a [NftTransferRow],
}

impl TokenLedger<'_> {
    /// Token amounts ordered by token id.
    pub fn amounts(&self) -> Result<Vec<Amount>, EntityIdError> {
        let snapshot: HashMap<i64, i64> = self
            .snapshot_balances
            .iter()
            .map(|row| (row.token_id, row.balance))
            .collect();

        let mut fungible_deltas: HashMap<i64, i64> = HashMap::new();
        for transfer in self.token_transfers {
            if transfer.token_type == TokenType::FungibleCommon {
                *fungible_deltas.entry(transfer.token_id).or_insert(0) += transfer.amount;
            }
        }
        let nft_deltas = net_nft_count(self.account, self.nft_transfers);

        let mut associations: Vec<&TokenAssociationRow> = self.associations.iter().collect();
        associations.sort_by_key(|row| row.token_id);

        let mut amounts = Vec::with_capacity(associations.len());
        for association in associations {
            let value = if association.associated {
                let base = snapshot.get(&association.token_id).copied().unwrap_or(0);
                let deltas = match association.token_type {
                    TokenType::FungibleCommon => &fungible_deltas,
                    TokenType::NonFungibleUnique => &nft_deltas,
                };
                base + deltas.get(&association.token_id).copied().unwrap_or(0)
            } else if association.timestamp > self.snapshot_timestamp {
                0
            } else {
                continue;
            };

            amounts.push(Amount::Token(TokenAmount {
                token_id: EntityId::decode(association.token_id)?,
                decimals: association.decimals,
                token_type: association.token_type,
                value,
                serial_numbers: Vec::new(),
            }));
        }
        Ok(amounts)
    }
}
