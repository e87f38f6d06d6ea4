use crate::traits::{AccountDirectory, InventoryManagement, OrderManagement, PendingPaymentManagement, StoreError};

/// This trait defines the highest level of behaviour for backends supporting the checkout engine. A backend that
/// implements it can serve every checkout API.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase:
    Clone + OrderManagement + PendingPaymentManagement + InventoryManagement + AccountDirectory
{
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
