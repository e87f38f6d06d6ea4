use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The gateway did not respond in time: {0}")]
    Timeout(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl RazorpayApiError {
    /// Transport failures and 5xx responses are worth retrying. A 4xx means the request itself was wrong.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RestResponseError(_) => true,
            Self::QueryError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
