//! # Operation Assembly
//!
//! Turns transaction rows into account-model transactions made of indexed
//! operations.
//!
//! ## Per-Row Order
//!
//! 1. Non-fee hbar transfers, with the row's status
//! 2. Fee hbar transfers, always successful
//! 3. Staking reward credits and the matching payer debit
//! 4. Fungible token transfers
//! 5. NFT serial movements (debit, then credit)
//! 6. The token definition, for token create/update/delete
//!
//! Rows sharing a hash form one transaction; operation indices run
//! contiguously across all of them.

use serde_json::{json, Map, Value};
use shared_types::{
    to_prefixed_hex, Amount, EntityId, LedgerError, Operation, TokenAmount, TokenType, Transaction,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::codes::{
    transaction_type, CodeBook, FEE_OPERATION_TYPE, STAKING_REWARD_OPERATION_TYPE, SUCCESS_STATUS,
};
use super::errors::{corrupt_entity, decode_entity};
use super::rows::{HbarTransfer, TokenRow, TransactionRow, TransferCorrection};
use super::transfer::Transfer;

/// Builds transactions from rows.
#[derive(Debug, Clone)]
pub struct OperationAssembler {
    codes: Arc<CodeBook>,
    staking_reward_account: i64,
}

impl OperationAssembler {
    pub fn new(codes: Arc<CodeBook>, staking_reward_account: EntityId) -> Self {
        Self {
            codes,
            staking_reward_account: staking_reward_account.encode(),
        }
    }

    pub fn codes(&self) -> &CodeBook {
        &self.codes
    }

    /// Group rows by hash in order of first appearance and build one
    /// transaction per group.
    pub fn assemble(&self, rows: &[TransactionRow]) -> Result<Vec<Transaction>, LedgerError> {
        let mut positions: HashMap<&[u8], usize> = HashMap::new();
        let mut groups: Vec<Vec<&TransactionRow>> = Vec::new();
        for row in rows {
            match positions.get(row.hash.as_slice()) {
                Some(&position) => groups[position].push(row),
                None => {
                    positions.insert(row.hash.as_slice(), groups.len());
                    groups.push(vec![row]);
                }
            }
        }

        groups
            .iter()
            .map(|group| self.build_transaction(group))
            .collect()
    }

    /// Build a transaction from rows that share one hash.
    pub fn build_transaction(&self, rows: &[&TransactionRow]) -> Result<Transaction, LedgerError> {
        let first = *rows
            .first()
            .ok_or_else(|| LedgerError::InternalServerError("empty transaction group".into()))?;
        let primary = rows
            .iter()
            .find(|row| self.codes.is_success(row.result))
            .copied();

        let mut operations = OperationList::default();
        match primary {
            Some(_) => {
                for row in rows {
                    self.append_row(row, &mut operations)?;
                }
            }
            None => {
                operations.push(
                    self.codes.transaction_type(first.transaction_type),
                    self.codes.result(first.result),
                    &HbarTransfer {
                        account_id: first.payer_account_id,
                        amount: 0,
                    },
                )?;
            }
        }

        let source = primary.unwrap_or(first);
        Ok(Transaction {
            hash: to_prefixed_hex(&first.hash),
            entity_id: source.entity_id.map(decode_entity).transpose()?,
            memo: source.memo.clone(),
            operations: operations.into_inner(),
        })
    }

    fn append_row(
        &self,
        row: &TransactionRow,
        operations: &mut OperationList,
    ) -> Result<(), LedgerError> {
        let operation_type = self.codes.transaction_type(row.transaction_type);
        let status = self.codes.result(row.result);
        let succeeded = self.codes.is_success(row.result);

        let non_fee = self.non_fee_transfers(row);
        for transfer in &non_fee {
            operations.push(operation_type, status, transfer)?;
        }

        let rewards = self.staking_reward_transfers(row);
        let applied_non_fee: &[HbarTransfer] = if succeeded { &non_fee } else { &[] };
        for fee in fee_transfers(row, applied_non_fee, &rewards) {
            operations.push(FEE_OPERATION_TYPE, SUCCESS_STATUS, &fee)?;
        }
        for reward in &rewards {
            operations.push(STAKING_REWARD_OPERATION_TYPE, SUCCESS_STATUS, reward)?;
        }

        for transfer in row
            .token_transfers
            .iter()
            .filter(|t| t.token_type == TokenType::FungibleCommon)
        {
            operations.push(operation_type, status, transfer)?;
        }

        for nft in &row.nft_transfers {
            for leg in nft.split() {
                operations.push(operation_type, status, &leg)?;
            }
        }

        if transaction_type::defines_token(row.transaction_type) {
            if let Some(token) = &row.token {
                operations.push_operation(Operation {
                    index: 0,
                    operation_type: operation_type.to_string(),
                    status: status.to_string(),
                    account_id: decode_entity(row.payer_account_id)?,
                    amount: Amount::Token(TokenAmount {
                        token_id: decode_entity(token.token_id)?,
                        decimals: token.decimals,
                        token_type: token.token_type,
                        value: 0,
                        serial_numbers: Vec::new(),
                    }),
                    metadata: Some(token_metadata(token)?),
                });
            }
        }

        Ok(())
    }

    /// Itemized hbar transfers of the row that actually touched the ledger.
    fn non_fee_transfers(&self, row: &TransactionRow) -> Vec<HbarTransfer> {
        let has_rewards = !row.staking_reward_transfers.is_empty();
        row.itemized_transfers
            .iter()
            .filter(|transfer| {
                (has_rewards && transfer.account_id == self.staking_reward_account)
                    || row
                        .crypto_transfers
                        .iter()
                        .any(|c| c.is_effective() && c.account_id == transfer.account_id)
            })
            .cloned()
            .collect()
    }

    /// Reward credits followed by one debit of their sum from the reward
    /// account.
    fn staking_reward_transfers(&self, row: &TransactionRow) -> Vec<HbarTransfer> {
        if row.staking_reward_transfers.is_empty() {
            return Vec::new();
        }
        let mut transfers: Vec<HbarTransfer> = row
            .staking_reward_transfers
            .iter()
            .map(|reward| HbarTransfer {
                account_id: reward.account_id,
                amount: reward.amount,
            })
            .collect();
        let total: i64 = transfers.iter().map(|t| t.amount).sum();
        transfers.push(HbarTransfer {
            account_id: self.staking_reward_account,
            amount: -total,
        });
        transfers
    }
}

/// Whatever the raw hbar movements of the row do not explain through its
/// non-fee and reward legs is a fee. Zero remainders are dropped; order
/// follows first appearance in the raw movements.
fn fee_transfers(
    row: &TransactionRow,
    non_fee: &[HbarTransfer],
    rewards: &[HbarTransfer],
) -> Vec<HbarTransfer> {
    let mut order: Vec<i64> = Vec::new();
    let mut totals: HashMap<i64, i64> = HashMap::new();
    for transfer in row.crypto_transfers.iter().filter(|t| t.is_effective()) {
        let total = totals.entry(transfer.account_id).or_insert_with(|| {
            order.push(transfer.account_id);
            0
        });
        *total += transfer.amount;
    }
    for transfer in non_fee.iter().chain(rewards) {
        if let Some(total) = totals.get_mut(&transfer.account_id) {
            *total -= transfer.amount;
        }
    }

    order
        .into_iter()
        .filter_map(|account_id| {
            let amount = totals.get(&account_id).copied().unwrap_or(0);
            (amount != 0).then_some(HbarTransfer { account_id, amount })
        })
        .collect()
}

fn token_metadata(token: &TokenRow) -> Result<Map<String, Value>, LedgerError> {
    let token_id = decode_entity(token.token_id)?;
    let value = json!({
        "currency": {
            "symbol": token_id.to_string(),
            "decimals": token.decimals,
            "metadata": { "type": token.token_type.as_str() },
        },
        "freeze_default": token.freeze_default,
        "initial_supply": token.initial_supply,
    });
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(LedgerError::InternalServerError(
            "token metadata is not an object".into(),
        )),
    }
}

/// Operations of one transaction, indexed in insertion order.
#[derive(Debug, Default)]
struct OperationList {
    operations: Vec<Operation>,
}

impl OperationList {
    fn push(
        &mut self,
        operation_type: &str,
        status: &str,
        transfer: &dyn Transfer,
    ) -> Result<(), LedgerError> {
        let operation = Operation {
            index: 0,
            operation_type: operation_type.to_string(),
            status: status.to_string(),
            account_id: decode_entity(transfer.account_id())?,
            amount: transfer.amount().map_err(corrupt_entity)?,
            metadata: None,
        };
        self.push_operation(operation);
        Ok(())
    }

    fn push_operation(&mut self, mut operation: Operation) {
        operation.index = self.operations.len() as i64;
        self.operations.push(operation);
    }

    fn into_inner(self) -> Vec<Operation> {
        self.operations
    }
}

/// A successful token dissociate deletes the association, and with it the
/// live join of its token transfers; such rows need their historical payload.
pub fn needs_correction(row: &TransactionRow, codes: &CodeBook) -> bool {
    row.transaction_type == transaction_type::TOKEN_DISSOCIATE && codes.is_success(row.result)
}

/// Replace the token and NFT payloads of rows with the historical ones.
///
/// Both inputs are ordered by consensus timestamp and every correction
/// matches exactly one row.
pub fn apply_corrections(rows: &mut [TransactionRow], corrections: Vec<TransferCorrection>) {
    let mut rows_iter = rows.iter_mut();
    for correction in corrections {
        for row in rows_iter.by_ref() {
            if row.consensus_timestamp == correction.consensus_timestamp {
                row.token_transfers = correction.token_transfers;
                row.nft_transfers = correction.nft_transfers;
                break;
            }
        }
    }
}
