//! Row interpretation errors.

use shared_types::{EntityId, EntityIdError, LedgerError};

/// Decode a packed id read from the store. A column that does not decode
/// means the row itself is corrupt.
pub fn decode_entity(raw: i64) -> Result<EntityId, LedgerError> {
    EntityId::decode(raw).map_err(corrupt_entity)
}

pub fn corrupt_entity(err: EntityIdError) -> LedgerError {
    LedgerError::InternalServerError(format!("corrupt entity id in ledger row: {}", err))
}
