use checkout_engine::db_types::ProductId;
use cucumber::given;

use crate::{cucumber::CheckoutWorld, support::TestSystem};

#[given("a fresh install")]
async fn fresh_database(world: &mut CheckoutWorld) {
    world.system = Some(TestSystem::new().await);
}

#[given(expr = "product '{word}' priced at {int} paise with {int} in stock")]
async fn product_in_stock(world: &mut CheckoutWorld, product: String, price: i64, stock: i64) {
    world.system().add_product(&product, price, stock).await;
}

#[given(expr = "customer '{word}' with a saved address")]
async fn customer_with_address(world: &mut CheckoutWorld, name: String) {
    let (id, _) = world.system().customer_with_address(&format!("{name}@example.com")).await;
    world.accounts.insert(name, id);
}

#[given(expr = "customer '{word}' without an address")]
async fn customer_without_address(world: &mut CheckoutWorld, name: String) {
    let id = world.system().customer(&format!("{name}@example.com")).await;
    world.accounts.insert(name, id);
}

#[given(expr = "'{word}' has {int} x '{word}' in their cart")]
async fn cart_item(world: &mut CheckoutWorld, name: String, quantity: i64, product: String) {
    let account_id = world.account(&name);
    world.system().db.set_cart_item(account_id, &ProductId::from(product), quantity).await.expect("Error filling cart");
}
