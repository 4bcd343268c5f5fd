use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::bundles::store::BundleStoreError;
use crate::error::{error_response, error_response_with_details};
use crate::platform::error::PlatformError;

/// Errors from the pure pricing resolver
///
/// These indicate a configuration or selection bug upstream and are always
/// surfaced to the caller verbatim, never silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("invalid pricing configuration: {0}")]
    InvalidPricingConfig(String),
}

/// Error types for checkout operations
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("bundle not found: {0}")]
    BundleNotFound(String),

    #[error("shop session is not authorized")]
    Unauthorized,

    /// Both the tagged-item path and the one-off fallback failed
    #[error("could not materialize a purchasable SKU")]
    MaterializationFailed,

    #[error("could not issue a discount code")]
    DiscountIssuanceFailed,

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("configuration store failure: {0}")]
    Store(String),

    #[error("validation error")]
    Validation(#[from] validator::ValidationErrors),
}

impl From<BundleStoreError> for CheckoutError {
    fn from(err: BundleStoreError) -> Self {
        match err {
            BundleStoreError::NotFound(bundle_id) => CheckoutError::BundleNotFound(bundle_id),
            other => CheckoutError::Store(other.to_string()),
        }
    }
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        match self {
            CheckoutError::Pricing(err) => {
                // Expected client/config errors, surfaced verbatim
                tracing::debug!("pricing rejected the request: {}", err);
                let code = match err {
                    PricingError::InvalidSelection(_) => "INVALID_SELECTION",
                    PricingError::InvalidPricingConfig(_) => "INVALID_PRICING_CONFIG",
                };
                error_response(StatusCode::BAD_REQUEST, code, err.to_string())
            }
            CheckoutError::Validation(errors) => {
                tracing::debug!("request validation failed: {:?}", errors);
                error_response_with_details(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Request validation failed",
                    serde_json::to_value(errors).ok(),
                )
            }
            CheckoutError::BundleNotFound(bundle_id) => {
                tracing::debug!("bundle {} not found", bundle_id);
                error_response(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Bundle with id {} not found", bundle_id),
                )
            }
            CheckoutError::Unauthorized | CheckoutError::Platform(PlatformError::Unauthorized) => {
                tracing::warn!("checkout attempted without a valid shop session");
                error_response(
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Shop is not authorized",
                )
            }
            // The buyer never sees raw platform errors; log the detail and
            // return the generic outcome
            CheckoutError::MaterializationFailed => {
                tracing::error!("materialization exhausted both paths");
                Self::unavailable()
            }
            CheckoutError::DiscountIssuanceFailed => {
                tracing::error!("discount issuance failed with no fallback");
                Self::unavailable()
            }
            CheckoutError::Platform(err) => {
                tracing::error!("platform error reached the response layer: {}", err);
                Self::unavailable()
            }
            CheckoutError::Store(detail) => {
                tracing::error!("configuration store failure: {}", detail);
                Self::unavailable()
            }
        }
    }
}

impl CheckoutError {
    fn unavailable() -> Response {
        error_response(
            StatusCode::BAD_GATEWAY,
            "CHECKOUT_UNAVAILABLE",
            "Could not prepare this bundle for checkout",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::InvalidSelection("item x is not part of bundle b".to_string());
        assert_eq!(
            err.to_string(),
            "invalid selection: item x is not part of bundle b"
        );

        let err = PricingError::InvalidPricingConfig("fixed mode requires a value".to_string());
        assert_eq!(
            err.to_string(),
            "invalid pricing configuration: fixed mode requires a value"
        );
    }

    #[test]
    fn test_store_not_found_becomes_bundle_not_found() {
        let err: CheckoutError = BundleStoreError::NotFound("b1".to_string()).into();
        assert!(matches!(err, CheckoutError::BundleNotFound(id) if id == "b1"));
    }

    #[test]
    fn test_store_remote_becomes_store_error() {
        let err: CheckoutError = BundleStoreError::Remote {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, CheckoutError::Store(_)));
    }
}
