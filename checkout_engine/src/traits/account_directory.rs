use crate::{
    db_types::{CartItem, ShippingAddress},
    traits::StoreError,
};

/// Read access to accounts and the bits of account state that checkout touches: saved addresses and the live cart.
#[allow(async_fn_in_trait)]
pub trait AccountDirectory {
    /// The account's saved addresses, in the order they were added.
    async fn fetch_addresses(&self, account_id: i64) -> Result<Vec<ShippingAddress>, StoreError>;

    async fn fetch_cart(&self, account_id: i64) -> Result<Vec<CartItem>, StoreError>;

    /// Empties the account's cart, returning the number of lines removed.
    async fn clear_cart(&self, account_id: i64) -> Result<u64, StoreError>;
}
