//! Primitives shared by every crate in the checkout workspace.
//!
//! * [`Paise`] is the money type. All amounts are integers in the smallest currency unit, exactly as the payment
//!   gateway expects them.
//! * [`Secret`] hides sensitive configuration values from `Debug` and `Display` output.
//! * [`parse_boolean_flag`] is the one place where environment flags are interpreted.
mod helpers;
mod money;

pub mod op;
mod secret;

pub use helpers::parse_boolean_flag;
pub use money::{rounded_paise, Paise, PaiseConversionError, DEFAULT_CURRENCY_CODE};
pub use secret::Secret;
