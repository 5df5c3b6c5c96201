//! # Shared Types Crate
//!
//! Types shared by the ledger reconstruction engine and its consumers.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the read models handed to the API layer and
//!   the error taxonomy are defined here and nowhere else.
//! - **Packed Identifiers**: `EntityId` is the only way to move between the
//!   store's packed 64-bit ids and `shard.realm.num`.
//! - **Read Only**: nothing in this crate describes a mutation.

pub mod entities;
pub mod entity_id;
pub mod errors;

pub use entities::*;
pub use entity_id::{EntityId, EntityIdError, MAX_NUMBER, MAX_REALM, MAX_SHARD};
pub use errors::*;
