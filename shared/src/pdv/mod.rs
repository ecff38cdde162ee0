//! PDV comanda (cart)
//!
//! Lines are accumulated locally and turned into an [`OrderCreate`] on
//! finalize. All totals are computed with `Decimal`, see [`money`].

pub mod money;


use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{
    OrderCreate, OrderItemCreate, OrderSource, OrderStatus, OrderType, PaymentMethod, Product,
};
use money::{normalize_note, to_decimal, to_f64, validate_amount, validate_quantity};

/// One cart line (price snapshot taken when the product was added)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub note: Option<String>,
}

impl CartLine {
    fn subtotal(&self) -> Decimal {
        to_decimal(self.unit_price) * Decimal::from(self.quantity)
    }
}

/// Computed totals of a cart
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub item_count: i32,
    pub subtotal: f64,
    pub discount: f64,
    pub service_fee: f64,
    pub delivery_fee: f64,
    pub total: f64,
}

/// Order header data supplied at finalize time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderMeta {
    #[serde(default)]
    pub order_type: OrderType,
    pub mesa_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

/// Line of a checkout request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantity: i32,
    pub note: Option<String>,
}

/// PDV preview / finalize payload
///
/// Prices are never taken from the client; the server resolves every
/// `product_id` against the catalog and rebuilds the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub meta: OrderMeta,
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub discount: f64,
    /// Defaults to the restaurant's configured fee
    pub service_fee_percent: Option<f64>,
    #[serde(default)]
    pub delivery_fee: f64,
}

/// PDV comanda
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount: f64,
    service_fee_percent: f64,
    delivery_fee: f64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a product. A line with the same product and the same note
    /// absorbs the quantity instead of creating a new line.
    ///
    /// Returns the index of the affected line.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i32,
        note: Option<&str>,
    ) -> AppResult<usize> {
        if !product.is_active || !product.is_available {
            return Err(AppError::with_message(
                ErrorCode::ProductUnavailable,
                format!("{} is not available", product.name),
            )
            .with_detail("product_id", product.id));
        }
        crate::models::validate_price(product.price)?;
        validate_quantity(quantity)?;
        let note = normalize_note(note)?;

        if let Some(idx) = self
            .lines
            .iter()
            .position(|l| l.product_id == product.id && l.note == note)
        {
            let merged = self.lines[idx].quantity.saturating_add(quantity);
            validate_quantity(merged)?;
            self.lines[idx].quantity = merged;
            return Ok(idx);
        }

        self.lines.push(CartLine {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity,
            note,
        });
        Ok(self.lines.len() - 1)
    }

    /// Set a line's quantity; zero removes the line
    pub fn update_quantity(&mut self, line: usize, quantity: i32) -> AppResult<()> {
        self.line_index(line)?;
        if quantity == 0 {
            self.lines.remove(line);
            return Ok(());
        }
        validate_quantity(quantity)?;
        self.lines[line].quantity = quantity;
        Ok(())
    }

    pub fn set_note(&mut self, line: usize, note: Option<&str>) -> AppResult<()> {
        self.line_index(line)?;
        self.lines[line].note = normalize_note(note)?;
        Ok(())
    }

    pub fn remove_item(&mut self, line: usize) -> AppResult<CartLine> {
        self.line_index(line)?;
        Ok(self.lines.remove(line))
    }

    /// Empty the cart, keeping the fee configuration
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = 0.0;
    }

    /// Discount in reais; may not exceed the current subtotal
    pub fn set_discount(&mut self, amount: f64) -> AppResult<()> {
        validate_amount(amount, "discount")?;
        if to_decimal(amount) > self.subtotal_decimal() {
            return Err(Self::discount_error(amount));
        }
        self.discount = amount;
        Ok(())
    }

    /// Service fee ("10% do garçom") in percent, 0..=100
    pub fn set_service_fee_percent(&mut self, percent: f64) -> AppResult<()> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("service fee must be between 0 and 100, got {percent}"),
            )
            .with_detail("field", "service_fee_percent"));
        }
        self.service_fee_percent = percent;
        Ok(())
    }

    pub fn set_delivery_fee(&mut self, amount: f64) -> AppResult<()> {
        validate_amount(amount, "delivery_fee")?;
        self.delivery_fee = amount;
        Ok(())
    }

    pub fn totals(&self) -> CartTotals {
        let hundred = Decimal::ONE_HUNDRED;
        let subtotal = money::round_money(self.subtotal_decimal());
        let discount = money::round_money(to_decimal(self.discount));
        let service_fee = money::round_money(subtotal * to_decimal(self.service_fee_percent) / hundred);
        let delivery_fee = money::round_money(to_decimal(self.delivery_fee));
        let total = (subtotal - discount + service_fee + delivery_fee).max(Decimal::ZERO);

        CartTotals {
            item_count: self.lines.iter().map(|l| l.quantity).sum(),
            subtotal: to_f64(subtotal),
            discount: to_f64(discount),
            service_fee: to_f64(service_fee),
            delivery_fee: to_f64(delivery_fee),
            total: to_f64(total),
        }
    }

    /// Build the order payload for a PDV sale
    pub fn to_order(&self, meta: OrderMeta) -> AppResult<OrderCreate> {
        if self.lines.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        if to_decimal(self.discount) > self.subtotal_decimal() {
            return Err(Self::discount_error(self.discount));
        }
        match meta.order_type {
            OrderType::Mesa if meta.mesa_id.is_none() => {
                return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", "mesa_id"));
            }
            OrderType::Delivery
                if meta
                    .delivery_address
                    .as_deref()
                    .is_none_or(|a| a.trim().is_empty()) =>
            {
                return Err(AppError::new(ErrorCode::RequiredField)
                    .with_detail("field", "delivery_address"));
            }
            _ => {}
        }

        let totals = self.totals();
        let items = self
            .lines
            .iter()
            .map(|l| OrderItemCreate {
                product_id: Some(l.product_id),
                product_name: l.product_name.clone(),
                unit_price: l.unit_price,
                quantity: l.quantity,
                note: l.note.clone(),
                subtotal: to_f64(l.subtotal()),
            })
            .collect();

        Ok(OrderCreate {
            source: OrderSource::Pdv,
            order_type: meta.order_type,
            status: OrderStatus::Pendente,
            mesa_id: match meta.order_type {
                OrderType::Mesa => meta.mesa_id,
                _ => None,
            },
            customer_name: meta.customer_name,
            customer_phone: meta.customer_phone,
            delivery_address: meta.delivery_address,
            payment_method: meta.payment_method,
            subtotal: totals.subtotal,
            discount: totals.discount,
            service_fee: totals.service_fee,
            delivery_fee: totals.delivery_fee,
            total: totals.total,
            notes: meta.notes,
            external_id: None,
            items,
        })
    }

    fn subtotal_decimal(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    fn line_index(&self, line: usize) -> AppResult<()> {
        if line >= self.lines.len() {
            return Err(AppError::new(ErrorCode::OrderItemNotFound).with_detail("line", line));
        }
        Ok(())
    }

    fn discount_error(amount: f64) -> AppError {
        AppError::with_message(
            ErrorCode::DiscountExceedsSubtotal,
            format!("discount {amount} exceeds the subtotal"),
        )
        .with_detail("field", "discount")
    }
}
