use std::{collections::HashMap, fmt::Debug};

use checkout_engine::{checkout_objects::ReconcileOutcome, ReconcileError};
use cucumber::World;

use crate::support::TestSystem;

#[derive(Default, World)]
pub struct CheckoutWorld {
    pub system: Option<TestSystem>,
    pub accounts: HashMap<String, i64>,
    pub last_outcome: Option<Result<ReconcileOutcome, ReconcileError>>,
    pub last_order_id: Option<i64>,
}

impl Debug for CheckoutWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutWorld")
            .field("db", &self.system.as_ref().map(|s| s.url.as_str()))
            .field("accounts", &self.accounts)
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

impl CheckoutWorld {
    pub fn system(&self) -> &TestSystem {
        self.system.as_ref().expect("Checkout system not initialised")
    }

    pub fn account(&self, name: &str) -> i64 {
        *self.accounts.get(name).unwrap_or_else(|| panic!("No account called {name}"))
    }

    pub fn record(&mut self, outcome: Result<ReconcileOutcome, ReconcileError>) {
        if let Ok(o) = &outcome {
            if let Some(order) = o.order() {
                self.last_order_id = Some(order.id);
            }
        }
        self.last_outcome = Some(outcome);
    }
}
