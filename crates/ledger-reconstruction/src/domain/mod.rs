//! # Domain Layer
//!
//! Pure reconstruction logic over ledger rows. Nothing here performs I/O;
//! the service feeds rows in and receives read models back.
//!
//! ## Modules
//!
//! - `rows` - Rows as the store returns them (packed ids)
//! - `transfer` - The common view of every balance movement
//! - `genesis` - Block boundaries and hash normalization
//! - `balance` - Snapshot plus delta arithmetic
//! - `operations` - Operation assembly and transfer corrections
//! - `address_book` - Node endpoint aggregation
//! - `codes` - Transaction type and result names
//! - `value_objects` - Engine configuration
//! - `errors` - Row interpretation errors

pub mod address_book;
pub mod balance;
pub mod codes;
pub mod errors;
pub mod genesis;
pub mod operations;
pub mod rows;
pub mod transfer;
pub mod value_objects;

pub use balance::{BalanceWindow, TokenLedger};
pub use codes::CodeBook;
pub use operations::OperationAssembler;
pub use rows::*;
pub use transfer::{NftDirection, SingleNftTransfer, Transfer};
pub use value_objects::{ConfigError, LedgerConfig};
