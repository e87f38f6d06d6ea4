pub mod order_log;
pub mod razorpay;

pub use order_log::create_order_log_handlers;
pub use razorpay::RazorpayGateway;
