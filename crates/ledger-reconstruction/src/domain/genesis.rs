//! # Block Boundaries
//!
//! Record files become blocks. The first block the account model can serve is
//! the one containing the first balance snapshot; everything before it is
//! unreachable because no starting balance exists for it.

use shared_types::{Block, LedgerError, Timestamp};

use super::rows::RecordFileRow;

/// Build the genesis block from the first record file ending after the first
/// snapshot. A snapshot inside the file's native range moves the effective
/// start just past it, so the snapshot itself is never replayed.
pub fn genesis_block(row: &RecordFileRow, first_snapshot: Timestamp) -> Block {
    let consensus_start = if row.consensus_start <= first_snapshot {
        first_snapshot + 1
    } else {
        row.consensus_start
    };
    let hash = prefixed(&row.hash);
    Block {
        index: row.index,
        parent_index: row.index,
        parent_hash: hash.clone(),
        hash,
        consensus_start,
        consensus_end: row.consensus_end,
    }
}

/// Project a record file onto a block, given the resolved genesis.
pub fn to_block(row: &RecordFileRow, genesis: &Block) -> Block {
    if row.index == genesis.index {
        return genesis.clone();
    }
    Block {
        index: row.index,
        hash: prefixed(&row.hash),
        parent_index: row.index - 1,
        parent_hash: prefixed(&row.prev_hash),
        consensus_start: row.consensus_start,
        consensus_end: row.consensus_end,
    }
}

/// Canonical lowercase form of a caller-supplied block or transaction hash,
/// without prefix.
pub fn normalize_hash(input: &str) -> Result<String, LedgerError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(LedgerError::InvalidArgument("hash must not be empty".to_string()));
    }
    if digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(LedgerError::InvalidArgument(format!(
            "hash {:?} is not valid hex",
            input
        )));
    }
    Ok(digits.to_ascii_lowercase())
}

/// Decode a caller-supplied hash into bytes.
pub fn decode_hash(input: &str) -> Result<Vec<u8>, LedgerError> {
    let normalized = normalize_hash(input)?;
    hex::decode(&normalized).map_err(|e| LedgerError::InvalidArgument(e.to_string()))
}

fn prefixed(hash: &str) -> String {
    if hash.starts_with("0x") {
        hash.to_ascii_lowercase()
    } else {
        format!("0x{}", hash.to_ascii_lowercase())
    }
}
