//! # Code Book
//!
//! Names for the numeric transaction type and result codes stored with every
//! transaction row. The tables are injected so deployments can extend them;
//! anything not in the table renders as [`UNKNOWN`].

use std::collections::HashMap;

pub const UNKNOWN: &str = "UNKNOWN";

/// Operation type of fee legs.
pub const FEE_OPERATION_TYPE: &str = "FEE";

/// Operation type of staking reward legs.
pub const STAKING_REWARD_OPERATION_TYPE: &str = "CRYPTOTRANSFER";

/// Status of synthetic legs that always apply (fees, staking rewards).
pub const SUCCESS_STATUS: &str = "SUCCESS";

pub mod transaction_type {
    pub const CRYPTO_CREATE_ACCOUNT: i32 = 11;
    pub const CRYPTO_DELETE: i32 = 12;
    pub const CRYPTO_TRANSFER: i32 = 14;
    pub const CRYPTO_UPDATE_ACCOUNT: i32 = 15;
    pub const CONSENSUS_SUBMIT_MESSAGE: i32 = 27;
    pub const TOKEN_CREATION: i32 = 29;
    pub const TOKEN_FREEZE: i32 = 31;
    pub const TOKEN_UNFREEZE: i32 = 32;
    pub const TOKEN_GRANT_KYC: i32 = 33;
    pub const TOKEN_REVOKE_KYC: i32 = 34;
    pub const TOKEN_DELETION: i32 = 35;
    pub const TOKEN_UPDATE: i32 = 36;
    pub const TOKEN_MINT: i32 = 37;
    pub const TOKEN_BURN: i32 = 38;
    pub const TOKEN_WIPE: i32 = 39;
    pub const TOKEN_ASSOCIATE: i32 = 40;
    pub const TOKEN_DISSOCIATE: i32 = 41;
    pub const SCHEDULE_CREATE: i32 = 42;
    pub const CRYPTO_APPROVE_ALLOWANCE: i32 = 48;
    pub const ETHEREUM_TRANSACTION: i32 = 50;
    pub const NODE_STAKE_UPDATE: i32 = 51;
    pub const UTIL_PRNG: i32 = 52;

    /// Types whose operations carry the token definition.
    pub fn defines_token(code: i32) -> bool {
        matches!(code, TOKEN_CREATION | TOKEN_DELETION | TOKEN_UPDATE)
    }
}

pub mod result {
    pub const INVALID_SIGNATURE: i32 = 7;
    pub const INSUFFICIENT_PAYER_BALANCE: i32 = 10;
    pub const INSUFFICIENT_TX_FEE: i32 = 11;
    pub const INVALID_ACCOUNT_ID: i32 = 15;
    pub const SUCCESS: i32 = 22;
    pub const INSUFFICIENT_ACCOUNT_BALANCE: i32 = 28;
    pub const ACCOUNT_DELETED: i32 = 72;
    pub const FEE_SCHEDULE_FILE_PART_UPLOADED: i32 = 104;
    pub const INVALID_TOKEN_ID: i32 = 167;
    pub const TOKEN_NOT_ASSOCIATED_TO_ACCOUNT: i32 = 184;
    pub const SUCCESS_BUT_MISSING_EXPECTED_OPERATION: i32 = 220;
}

const DEFAULT_TRANSACTION_TYPES: &[(i32, &str)] = &[
    (transaction_type::CRYPTO_CREATE_ACCOUNT, "CRYPTOCREATEACCOUNT"),
    (transaction_type::CRYPTO_DELETE, "CRYPTODELETE"),
    (transaction_type::CRYPTO_TRANSFER, "CRYPTOTRANSFER"),
    (transaction_type::CRYPTO_UPDATE_ACCOUNT, "CRYPTOUPDATEACCOUNT"),
    (transaction_type::CONSENSUS_SUBMIT_MESSAGE, "CONSENSUSSUBMITMESSAGE"),
    (transaction_type::TOKEN_CREATION, "TOKENCREATION"),
    (transaction_type::TOKEN_FREEZE, "TOKENFREEZE"),
    (transaction_type::TOKEN_UNFREEZE, "TOKENUNFREEZE"),
    (transaction_type::TOKEN_GRANT_KYC, "TOKENGRANTKYC"),
    (transaction_type::TOKEN_REVOKE_KYC, "TOKENREVOKEKYC"),
    (transaction_type::TOKEN_DELETION, "TOKENDELETION"),
    (transaction_type::TOKEN_UPDATE, "TOKENUPDATE"),
    (transaction_type::TOKEN_MINT, "TOKENMINT"),
    (transaction_type::TOKEN_BURN, "TOKENBURN"),
    (transaction_type::TOKEN_WIPE, "TOKENWIPE"),
    (transaction_type::TOKEN_ASSOCIATE, "TOKENASSOCIATE"),
    (transaction_type::TOKEN_DISSOCIATE, "TOKENDISSOCIATE"),
    (transaction_type::SCHEDULE_CREATE, "SCHEDULECREATE"),
    (transaction_type::CRYPTO_APPROVE_ALLOWANCE, "CRYPTOAPPROVEALLOWANCE"),
    (transaction_type::ETHEREUM_TRANSACTION, "ETHEREUMTRANSACTION"),
    (transaction_type::NODE_STAKE_UPDATE, "NODESTAKEUPDATE"),
    (transaction_type::UTIL_PRNG, "UTILPRNG"),
];

const DEFAULT_RESULTS: &[(i32, &str)] = &[
    (result::INVALID_SIGNATURE, "INVALID_SIGNATURE"),
    (result::INSUFFICIENT_PAYER_BALANCE, "INSUFFICIENT_PAYER_BALANCE"),
    (result::INSUFFICIENT_TX_FEE, "INSUFFICIENT_TX_FEE"),
    (result::INVALID_ACCOUNT_ID, "INVALID_ACCOUNT_ID"),
    (result::SUCCESS, "SUCCESS"),
    (result::INSUFFICIENT_ACCOUNT_BALANCE, "INSUFFICIENT_ACCOUNT_BALANCE"),
    (result::ACCOUNT_DELETED, "ACCOUNT_DELETED"),
    (
        result::FEE_SCHEDULE_FILE_PART_UPLOADED,
        "FEE_SCHEDULE_FILE_PART_UPLOADED",
    ),
    (result::INVALID_TOKEN_ID, "INVALID_TOKEN_ID"),
    (
        result::TOKEN_NOT_ASSOCIATED_TO_ACCOUNT,
        "TOKEN_NOT_ASSOCIATED_TO_ACCOUNT",
    ),
    (
        result::SUCCESS_BUT_MISSING_EXPECTED_OPERATION,
        "SUCCESS_BUT_MISSING_EXPECTED_OPERATION",
    ),
];

/// Lookup tables from numeric codes to their names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBook {
    transaction_types: HashMap<i32, String>,
    results: HashMap<i32, String>,
}

impl Default for CodeBook {
    fn default() -> Self {
        Self::new(
            DEFAULT_TRANSACTION_TYPES
                .iter()
                .map(|(code, name)| (*code, (*name).to_string())),
            DEFAULT_RESULTS
                .iter()
                .map(|(code, name)| (*code, (*name).to_string())),
        )
    }
}

impl CodeBook {
    pub fn new(
        transaction_types: impl IntoIterator<Item = (i32, String)>,
        results: impl IntoIterator<Item = (i32, String)>,
    ) -> Self {
        Self {
            transaction_types: transaction_types.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }

    /// Add or replace entries on top of the current tables.
    pub fn extend(
        mut self,
        transaction_types: impl IntoIterator<Item = (i32, String)>,
        results: impl IntoIterator<Item = (i32, String)>,
    ) -> Self {
        self.transaction_types.extend(transaction_types);
        self.results.extend(results);
        self
    }

    pub fn transaction_type(&self, code: i32) -> &str {
        self.transaction_types
            .get(&code)
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    pub fn result(&self, code: i32) -> &str {
        self.results.get(&code).map(String::as_str).unwrap_or(UNKNOWN)
    }

    /// Whether the result code means the transaction's effects applied.
    pub fn is_success(&self, code: i32) -> bool {
        matches!(
            code,
            result::SUCCESS
                | result::FEE_SCHEDULE_FILE_PART_UPLOADED
                | result::SUCCESS_BUT_MISSING_EXPECTED_OPERATION
        )
    }
}
