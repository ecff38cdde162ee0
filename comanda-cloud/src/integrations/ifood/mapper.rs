//! iFood payload mapping

use serde::{Deserialize, Serialize};
use shared::models::{
    OrderCreate, OrderItemCreate, OrderSource, OrderStatus, OrderType, PaymentMethod,
};
use shared::pdv::money::{round_money, to_decimal, to_f64};
use std::collections::HashSet;

/// Order status action on the iFood side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfoodAction {
    Confirm,
    StartPreparation,
    ReadyToPickup,
    Dispatch,
    RequestCancellation,
}

impl IfoodAction {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::StartPreparation => "startPreparation",
            Self::ReadyToPickup => "readyToPickup",
            Self::Dispatch => "dispatch",
            Self::RequestCancellation => "requestCancellation",
        }
    }
}

/// Actions to forward for a local status change
///
/// Orders that were not auto-confirmed get `confirm` before preparation.
pub fn status_actions(status: OrderStatus, auto_confirm: bool) -> Vec<IfoodAction> {
    match status {
        OrderStatus::Preparando if auto_confirm => vec![IfoodAction::StartPreparation],
        OrderStatus::Preparando => vec![IfoodAction::Confirm, IfoodAction::StartPreparation],
        OrderStatus::Pronto => vec![IfoodAction::ReadyToPickup],
        OrderStatus::SaiuEntrega => vec![IfoodAction::Dispatch],
        OrderStatus::Cancelado => vec![IfoodAction::RequestCancellation],
        OrderStatus::Pendente | OrderStatus::Entregue => Vec::new(),
    }
}

// ---- iFood order payload (subset) ----

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfoodOrder {
    pub id: String,
    #[serde(default)]
    pub display_id: Option<String>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub customer: Option<IfoodCustomer>,
    #[serde(default)]
    pub delivery: Option<IfoodDelivery>,
    #[serde(default)]
    pub items: Vec<IfoodItem>,
    #[serde(default)]
    pub total: IfoodTotal,
    #[serde(default)]
    pub payments: Option<IfoodPayments>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IfoodCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<IfoodPhone>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IfoodPhone {
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfoodDelivery {
    #[serde(default)]
    pub delivery_address: Option<IfoodAddress>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfoodAddress {
    #[serde(default)]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfoodItem {
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub observations: Option<String>,
    /// Merchant code; holds our product id when the catalog is linked
    #[serde(default)]
    pub external_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfoodTotal {
    #[serde(default)]
    pub sub_total: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    #[serde(default)]
    pub benefits: f64,
    #[serde(default)]
    pub order_amount: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IfoodPayments {
    #[serde(default)]
    pub methods: Vec<IfoodPaymentMethod>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IfoodPaymentMethod {
    #[serde(default)]
    pub method: String,
    /// `ONLINE` or `OFFLINE`
    #[serde(default, rename = "type")]
    pub kind: String,
}

fn payment_method(payments: Option<&IfoodPayments>) -> Option<PaymentMethod> {
    let first = payments?.methods.first()?;
    if first.kind.eq_ignore_ascii_case("ONLINE") {
        return Some(PaymentMethod::Online);
    }
    match first.method.to_ascii_uppercase().as_str() {
        "CASH" => Some(PaymentMethod::Dinheiro),
        "CREDIT" => Some(PaymentMethod::CartaoCredito),
        "DEBIT" => Some(PaymentMethod::CartaoDebito),
        "PIX" => Some(PaymentMethod::Pix),
        "MEAL_VOUCHER" | "FOOD_VOUCHER" => Some(PaymentMethod::Vale),
        _ => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Map an iFood order into a local order payload.
///
/// `known_products` holds the restaurant's product ids; items whose
/// external code matches one are linked, the rest keep only their name.
pub fn to_order_create(order: &IfoodOrder, known_products: &HashSet<i64>) -> OrderCreate {
    let items = order
        .items
        .iter()
        .map(|item| {
            let quantity = (item.quantity.round() as i32).max(1);
            let subtotal = item.total_price.unwrap_or_else(|| {
                to_f64(round_money(
                    to_decimal(item.unit_price) * rust_decimal::Decimal::from(quantity),
                ))
            });
            OrderItemCreate {
                product_id: item
                    .external_code
                    .as_deref()
                    .and_then(|c| c.trim().parse::<i64>().ok())
                    .filter(|id| known_products.contains(id)),
                product_name: item.name.clone(),
                unit_price: item.unit_price,
                quantity,
                note: non_empty(item.observations.as_deref()),
                subtotal,
            }
        })
        .collect();

    let order_type = match order.order_type.as_deref() {
        Some("DELIVERY") => OrderType::Delivery,
        _ => OrderType::Balcao,
    };
    let customer = order.customer.as_ref();

    OrderCreate {
        source: OrderSource::Ifood,
        order_type,
        status: OrderStatus::Pendente,
        mesa_id: None,
        customer_name: non_empty(customer.and_then(|c| c.name.as_deref())),
        customer_phone: non_empty(
            customer
                .and_then(|c| c.phone.as_ref())
                .and_then(|p| p.number.as_deref()),
        ),
        delivery_address: non_empty(
            order
                .delivery
                .as_ref()
                .and_then(|d| d.delivery_address.as_ref())
                .and_then(|a| a.formatted_address.as_deref()),
        ),
        payment_method: payment_method(order.payments.as_ref()),
        subtotal: order.total.sub_total,
        discount: order.total.benefits,
        service_fee: 0.0,
        delivery_fee: order.total.delivery_fee,
        total: order.total.order_amount,
        notes: order.display_id.as_ref().map(|d| format!("iFood #{d}")),
        external_id: Some(order.id.clone()),
        items,
    }
}
