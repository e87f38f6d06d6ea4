use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use checkout_engine::{FulfillmentError, OrdersApiError, ReconcileError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("The service is temporarily unavailable. Please try again. {0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::CouldNotIssueToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "success": false, "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Could not issue an access token. {0}")]
    CouldNotIssueToken(String),
}

impl From<ReconcileError> for ServerError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::Forbidden => Self::InsufficientPermissions(e.to_string()),
            ReconcileError::PendingPaymentNotFound(_) => Self::NoRecordFound(e.to_string()),
            ReconcileError::MissingFields(_) |
            ReconcileError::InvalidLineItem(_) |
            ReconcileError::InvalidAmount(_) |
            ReconcileError::InvalidSignature |
            ReconcileError::PaymentNotCaptured(_) |
            ReconcileError::PriceMismatch { .. } |
            ReconcileError::GatewayRejected(_) => Self::BadRequest(e.to_string()),
            ReconcileError::Timeout(_) | ReconcileError::GatewayError(_) | ReconcileError::StorageFailure(_) => {
                error!("💻️ Reconciliation failed, but may succeed on retry. {e}");
                Self::ServiceUnavailable(e.to_string())
            },
        }
    }
}

impl From<FulfillmentError> for ServerError {
    fn from(e: FulfillmentError) -> Self {
        match e {
            FulfillmentError::InvalidStatus(_) | FulfillmentError::TransitionForbidden { .. } => {
                Self::BadRequest(e.to_string())
            },
            FulfillmentError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            FulfillmentError::ConcurrentModification(_) |
            FulfillmentError::Timeout(_) |
            FulfillmentError::StorageFailure(_) => Self::ServiceUnavailable(e.to_string()),
        }
    }
}

impl From<OrdersApiError> for ServerError {
    fn from(e: OrdersApiError) -> Self {
        error!("💻️ Could not read orders. {e}");
        Self::ServiceUnavailable(e.to_string())
    }
}
