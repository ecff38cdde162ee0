//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::RestaurantNotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::ProductNotFound
            | Self::CategoryNotFound
            | Self::MesaNotFound
            | Self::AreaNotFound
            | Self::EmployeeNotFound
            | Self::NoSubscription => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::EmailAlreadyRegistered
            | Self::SlugTaken
            | Self::CategoryNameExists
            | Self::CategoryHasProducts
            | Self::MesaOccupied
            | Self::MesaNumberExists
            | Self::AreaHasMesas
            | Self::AreaNameExists
            | Self::EmployeeEmailExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled
            | Self::WebhookUnauthorized => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::OwnerRequired
            | Self::EmployeeCannotDeleteSelf
            | Self::SubscriptionBlocked
            | Self::PlanLimitReached => StatusCode::FORBIDDEN,

            // 422 Unprocessable
            Self::OrderEmpty
            | Self::ProductUnavailable
            | Self::DiscountExceedsSubtotal
            | Self::WhatsAppNotConfigured
            | Self::IfoodNotConfigured => StatusCode::UNPROCESSABLE_ENTITY,

            // 429 Too Many Requests
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway (third party failed)
            Self::BillingProviderError
            | Self::WhatsAppSendFailed
            | Self::IfoodAuthFailed
            | Self::IfoodRequestFailed => StatusCode::BAD_GATEWAY,

            // 400 Bad Request
            Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::PasswordTooShort
            | Self::InvalidQuantity
            | Self::InvalidAmount
            | Self::NoteTooLong
            | Self::ProductInvalidPrice
            | Self::InvalidPhoneNumber => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            Self::InternalError | Self::TemplateError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
        assert_eq!(ErrorCode::MesaNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::CategoryHasProducts.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::TokenExpired.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PlanLimitReached.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::OrderEmpty.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::IfoodRequestFailed.http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ErrorCode::InvalidQuantity.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::TemplateError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
