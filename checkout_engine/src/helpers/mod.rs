mod payment_signature;

pub use payment_signature::{PaymentSignature, SignatureVerifier};
