//! Row builders shared by unit tests and downstream test suites.

use shared_types::{EntityId, Timestamp, TokenType};

use crate::domain::rows::{
    AddressBookEndpointRow, CryptoTransferRow, EntityRow, HbarTransfer, NftTransferRow,
    RecordFileRow, TokenRow, TokenTransferRow, TransactionRow,
};

/// Default payer of rows built here.
pub const PAYER: i64 = 1001;

/// Default node account credited with fees.
pub const NODE: i64 = 3;

pub fn id(number: i64) -> EntityId {
    EntityId::of_num(number).unwrap_or_default()
}

/// Record file `index` spanning `[start, end]`, with hashes derived from the
/// index so neighbouring files chain.
pub fn record_file(index: i64, start: Timestamp, end: Timestamp) -> RecordFileRow {
    RecordFileRow {
        index,
        hash: block_hash(index),
        prev_hash: block_hash(index - 1),
        consensus_start: start,
        consensus_end: end,
    }
}

pub fn block_hash(index: i64) -> String {
    format!("{:064x}", index.max(0) as u64 + 0xabc0)
}

pub fn entity(id: i64) -> EntityRow {
    EntityRow {
        id,
        alias: None,
        deleted_at: None,
    }
}

pub fn crypto(account_id: i64, amount: i64) -> CryptoTransferRow {
    CryptoTransferRow {
        account_id,
        amount,
        errata: None,
    }
}

pub fn itemized(account_id: i64, amount: i64) -> HbarTransfer {
    HbarTransfer {
        account_id,
        amount,
    }
}

pub fn fungible(account_id: i64, token_id: i64, amount: i64) -> TokenTransferRow {
    TokenTransferRow {
        account_id,
        token_id,
        amount,
        decimals: 2,
        token_type: TokenType::FungibleCommon,
    }
}

pub fn nft(sender: Option<i64>, receiver: Option<i64>, token_id: i64, serial: i64) -> NftTransferRow {
    NftTransferRow {
        sender,
        receiver,
        serial_number: serial,
        token_id,
    }
}

pub fn token(token_id: i64, token_type: TokenType) -> TokenRow {
    TokenRow {
        token_id,
        decimals: match token_type {
            TokenType::FungibleCommon => 2,
            TokenType::NonFungibleUnique => 0,
        },
        token_type,
        freeze_default: false,
        initial_supply: 0,
    }
}

/// A transaction row paid by [`PAYER`] with no transfers.
pub fn transaction_row(
    consensus_timestamp: Timestamp,
    hash: &[u8],
    transaction_type: i32,
    result: i32,
) -> TransactionRow {
    TransactionRow {
        consensus_timestamp,
        hash: hash.to_vec(),
        transaction_type,
        result,
        payer_account_id: PAYER,
        entity_id: None,
        memo: Vec::new(),
        crypto_transfers: Vec::new(),
        itemized_transfers: Vec::new(),
        token_transfers: Vec::new(),
        nft_transfers: Vec::new(),
        staking_reward_transfers: Vec::new(),
        token: None,
    }
}

/// A successful transfer of `amount` from `from` to `to`, with `fee` paid by
/// `from` to [`NODE`].
pub fn hbar_transfer(
    consensus_timestamp: Timestamp,
    from: i64,
    to: i64,
    amount: i64,
    fee: i64,
) -> TransactionRow {
    let hash = consensus_timestamp.to_be_bytes();
    let mut row = transaction_row(consensus_timestamp, &hash, 14, 22);
    row.payer_account_id = from;
    row.crypto_transfers = vec![crypto(from, -(amount + fee)), crypto(to, amount)];
    if fee != 0 {
        row.crypto_transfers.push(crypto(NODE, fee));
    }
    row.itemized_transfers = vec![itemized(from, -amount), itemized(to, amount)];
    row
}

pub fn endpoint(node_id: i64, ip_address: &str, port: i32) -> AddressBookEndpointRow {
    AddressBookEndpointRow {
        node_id,
        node_account_id: node_id + 3,
        ip_address: ip_address.to_string(),
        port,
    }
}
