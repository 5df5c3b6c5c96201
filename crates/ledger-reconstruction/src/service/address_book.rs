//! Address book resolution with fallback file.

use shared_types::{AddressBookEntry, EntityId, LedgerError};
use tracing::debug;

use crate::adapters::scope::StoreScope;
use crate::domain::address_book::aggregate_endpoints;
use crate::ports::outbound::AddressBookStore;

#[derive(Debug, Clone)]
pub struct AddressBookResolver {
    primary: EntityId,
    fallback: EntityId,
}

impl AddressBookResolver {
    pub fn new(primary: EntityId, fallback: EntityId) -> Self {
        Self { primary, fallback }
    }

    /// Nodes of the latest primary address book, or of the fallback file when
    /// the primary has none.
    pub async fn entries<S>(
        &self,
        scope: &StoreScope<'_, S>,
    ) -> Result<Vec<AddressBookEntry>, LedgerError>
    where
        S: AddressBookStore + ?Sized,
    {
        let store = scope.store();
        let mut rows = scope
            .run(
                "latest_address_book_endpoints",
                store.latest_address_book_endpoints(self.primary.encode()),
            )
            .await?;
        if rows.is_empty() {
            debug!(primary = %self.primary, fallback = %self.fallback, "Primary address book empty");
            rows = scope
                .run(
                    "latest_address_book_endpoints",
                    store.latest_address_book_endpoints(self.fallback.encode()),
                )
                .await?;
        }
        aggregate_endpoints(&rows)
    }
}
