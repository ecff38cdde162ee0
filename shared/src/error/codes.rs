//! Unified error codes for comanda
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Restaurant (tenant) and subscription errors
//! - 4xxx: Order / PDV errors
//! - 5xxx: Payment and billing errors
//! - 6xxx: Product and category errors
//! - 7xxx: Mesa and area errors
//! - 80xx-84xx: Employee errors
//! - 85xx-89xx: Third-party integration errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the dashboard can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Email already registered
    EmailAlreadyRegistered = 1008,
    /// Password too short
    PasswordTooShort = 1009,
    /// Too many attempts
    TooManyAttempts = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Only the restaurant owner may do this
    OwnerRequired = 2002,

    // ==================== 3xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,
    /// Restaurant slug already taken
    SlugTaken = 3003,
    /// Subscription blocked (canceled or unpaid)
    SubscriptionBlocked = 3006,
    /// No subscription for restaurant
    NoSubscription = 3011,
    /// Plan limit reached (employees, products)
    PlanLimitReached = 3012,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order item / cart line not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,
    /// Quantity outside the accepted range
    InvalidQuantity = 4010,
    /// Monetary amount invalid (NaN, negative, too large)
    InvalidAmount = 4011,
    /// Note too long
    NoteTooLong = 4012,
    /// Discount exceeds subtotal
    DiscountExceedsSubtotal = 4013,

    // ==================== 5xxx: Payment ====================
    /// Billing provider (Pagar.me) returned an error
    BillingProviderError = 5101,
    /// Webhook authentication failed
    WebhookUnauthorized = 5102,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Product is unavailable
    ProductUnavailable = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category has products
    CategoryHasProducts = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,

    // ==================== 7xxx: Mesa ====================
    /// Mesa not found
    MesaNotFound = 7001,
    /// Mesa is occupied
    MesaOccupied = 7002,
    /// Mesa number already exists
    MesaNumberExists = 7003,
    /// Area not found
    AreaNotFound = 7101,
    /// Area has mesas
    AreaHasMesas = 7102,
    /// Area name already exists
    AreaNameExists = 7103,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Employee email already exists
    EmployeeEmailExists = 8002,
    /// Cannot delete self
    EmployeeCannotDeleteSelf = 8003,

    // ==================== 85xx: Integrations ====================
    /// WhatsApp integration not configured or disabled
    WhatsAppNotConfigured = 8501,
    /// WhatsApp provider rejected the message
    WhatsAppSendFailed = 8502,
    /// Phone number could not be normalized
    InvalidPhoneNumber = 8503,
    /// iFood integration not configured or disabled
    IfoodNotConfigured = 8511,
    /// iFood OAuth token request failed
    IfoodAuthFailed = 8512,
    /// iFood API request failed
    IfoodRequestFailed = 8513,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Template rendering failed
    TemplateError = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::TooManyAttempts => "Too many attempts",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::OwnerRequired => "Only the restaurant owner can do this",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::SlugTaken => "Restaurant slug is already taken",
            ErrorCode::SubscriptionBlocked => "Subscription is blocked",
            ErrorCode::NoSubscription => "No subscription",
            ErrorCode::PlanLimitReached => "Plan limit reached",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidQuantity => "Invalid quantity",
            ErrorCode::InvalidAmount => "Invalid amount",
            ErrorCode::NoteTooLong => "Note is too long",
            ErrorCode::DiscountExceedsSubtotal => "Discount exceeds subtotal",

            // Payment
            ErrorCode::BillingProviderError => "Billing provider error",
            ErrorCode::WebhookUnauthorized => "Webhook authentication failed",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::ProductUnavailable => "Product is unavailable",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasProducts => "Category has associated products",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // Mesa
            ErrorCode::MesaNotFound => "Mesa not found",
            ErrorCode::MesaOccupied => "Mesa is occupied",
            ErrorCode::MesaNumberExists => "Mesa number already exists",
            ErrorCode::AreaNotFound => "Area not found",
            ErrorCode::AreaHasMesas => "Area has associated mesas",
            ErrorCode::AreaNameExists => "Area name already exists",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeeEmailExists => "Employee email already exists",
            ErrorCode::EmployeeCannotDeleteSelf => "Cannot delete your own employee record",

            // Integrations
            ErrorCode::WhatsAppNotConfigured => "WhatsApp integration is not configured",
            ErrorCode::WhatsAppSendFailed => "WhatsApp message could not be sent",
            ErrorCode::InvalidPhoneNumber => "Invalid phone number",
            ErrorCode::IfoodNotConfigured => "iFood integration is not configured",
            ErrorCode::IfoodAuthFailed => "iFood authentication failed",
            ErrorCode::IfoodRequestFailed => "iFood request failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::TemplateError => "Template rendering failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::EmailAlreadyRegistered),
            1009 => Ok(ErrorCode::PasswordTooShort),
            1010 => Ok(ErrorCode::TooManyAttempts),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::OwnerRequired),

            // Restaurant
            3001 => Ok(ErrorCode::RestaurantNotFound),
            3003 => Ok(ErrorCode::SlugTaken),
            3006 => Ok(ErrorCode::SubscriptionBlocked),
            3011 => Ok(ErrorCode::NoSubscription),
            3012 => Ok(ErrorCode::PlanLimitReached),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4010 => Ok(ErrorCode::InvalidQuantity),
            4011 => Ok(ErrorCode::InvalidAmount),
            4012 => Ok(ErrorCode::NoteTooLong),
            4013 => Ok(ErrorCode::DiscountExceedsSubtotal),

            // Payment
            5101 => Ok(ErrorCode::BillingProviderError),
            5102 => Ok(ErrorCode::WebhookUnauthorized),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6003 => Ok(ErrorCode::ProductUnavailable),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasProducts),
            6103 => Ok(ErrorCode::CategoryNameExists),

            // Mesa
            7001 => Ok(ErrorCode::MesaNotFound),
            7002 => Ok(ErrorCode::MesaOccupied),
            7003 => Ok(ErrorCode::MesaNumberExists),
            7101 => Ok(ErrorCode::AreaNotFound),
            7102 => Ok(ErrorCode::AreaHasMesas),
            7103 => Ok(ErrorCode::AreaNameExists),

            // Employee
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::EmployeeEmailExists),
            8003 => Ok(ErrorCode::EmployeeCannotDeleteSelf),

            // Integrations
            8501 => Ok(ErrorCode::WhatsAppNotConfigured),
            8502 => Ok(ErrorCode::WhatsAppSendFailed),
            8503 => Ok(ErrorCode::InvalidPhoneNumber),
            8511 => Ok(ErrorCode::IfoodNotConfigured),
            8512 => Ok(ErrorCode::IfoodAuthFailed),
            8513 => Ok(ErrorCode::IfoodRequestFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9006 => Ok(ErrorCode::TemplateError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::RequiredField.code(), 7);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::PlanLimitReached.code(), 3012);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4007);
        assert_eq!(ErrorCode::BillingProviderError.code(), 5101);
        assert_eq!(ErrorCode::CategoryHasProducts.code(), 6102);
        assert_eq!(ErrorCode::AreaHasMesas.code(), 7102);
        assert_eq!(ErrorCode::EmployeeNotFound.code(), 8001);
        assert_eq!(ErrorCode::IfoodAuthFailed.code(), 8512);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_every_variant() {
        // Every code must survive a u16 roundtrip, otherwise the
        // dashboard receives codes it cannot map back.
        for value in 0u16..10_000 {
            if let Ok(code) = ErrorCode::try_from(value) {
                assert_eq!(code.code(), value);
            }
        }
        assert_eq!(ErrorCode::try_from(8513), Ok(ErrorCode::IfoodRequestFailed));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        // retired codes are not accepted back
        assert_eq!(ErrorCode::try_from(3), Err(InvalidErrorCode(3)));
        assert_eq!(ErrorCode::try_from(3002), Err(InvalidErrorCode(3002)));
        assert_eq!(ErrorCode::try_from(10_000), Err(InvalidErrorCode(10_000)));
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&ErrorCode::RequiredField).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&ErrorCode::OrderNotFound).unwrap(),
            "4001"
        );
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("7001").unwrap();
        assert_eq!(code, ErrorCode::MesaNotFound);

        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
        assert_eq!(ErrorCode::OrderNotFound.message(), "Order not found");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
