//! Product Model

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Maximum allowed product price (R$ 1.000.000)
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub sort_order: i32,
    /// Temporarily out (esgotado) but still listed on the menu
    pub is_available: bool,
    /// Soft-disable: hidden everywhere
    pub is_active: bool,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_available: Option<bool>,
    pub is_active: Option<bool>,
}

/// Validate a product price: finite, non-negative, at most [`MAX_PRICE`].
pub fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 || price > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("price must be between 0 and {MAX_PRICE}, got {price}"),
        )
        .with_detail("field", "price"));
    }
    Ok(())
}

/// Validate a product/category display name.
pub fn validate_name(name: &str, field: &'static str) -> Result<(), AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", field));
    }
    if trimmed.chars().count() > 120 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be at most 120 characters"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_validation() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(29.9).is_ok());
        assert!(validate_price(MAX_PRICE).is_ok());

        let err = validate_price(-1.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
        assert!(validate_price(MAX_PRICE + 0.01).is_err());
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("X-Burguer", "name").is_ok());
        assert_eq!(
            validate_name("   ", "name").unwrap_err().code,
            ErrorCode::RequiredField
        );
        assert_eq!(
            validate_name(&"a".repeat(121), "name").unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }
}
