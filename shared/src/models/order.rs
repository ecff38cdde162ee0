//! Order Model (pedidos)

use serde::{Deserialize, Serialize};

/// Order status
///
/// A flat set of labels: any status may be set from any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
pub enum OrderStatus {
    #[default]
    Pendente,
    Preparando,
    Pronto,
    SaiuEntrega,
    Entregue,
    Cancelado,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pendente,
        OrderStatus::Preparando,
        OrderStatus::Pronto,
        OrderStatus::SaiuEntrega,
        OrderStatus::Entregue,
        OrderStatus::Cancelado,
    ];

    /// Wire / database name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::Preparando => "preparando",
            Self::Pronto => "pronto",
            Self::SaiuEntrega => "saiu_entrega",
            Self::Entregue => "entregue",
            Self::Cancelado => "cancelado",
        }
    }

    /// Customer-facing label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pendente => "recebido",
            Self::Preparando => "em preparo",
            Self::Pronto => "pronto",
            Self::SaiuEntrega => "saiu para entrega",
            Self::Entregue => "entregue",
            Self::Cancelado => "cancelado",
        }
    }

    /// Whether the order still occupies the kitchen / mesa
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Entregue | Self::Cancelado)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Where the order came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "order_source", rename_all = "snake_case")
)]
pub enum OrderSource {
    #[default]
    Pdv,
    Ifood,
    Cardapio,
}

/// How the order is served
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "order_type", rename_all = "snake_case"))]
pub enum OrderType {
    #[default]
    Balcao,
    Mesa,
    Delivery,
}

/// Payment method recorded on the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
pub enum PaymentMethod {
    Dinheiro,
    CartaoCredito,
    CartaoDebito,
    Pix,
    Vale,
    /// Paid through the marketplace (iFood)
    Online,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Sequential number per restaurant, shown to customers
    pub number: i32,
    pub source: OrderSource,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub mesa_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub subtotal: f64,
    pub discount: f64,
    pub service_fee: f64,
    pub delivery_fee: f64,
    pub total: f64,
    pub notes: Option<String>,
    /// Marketplace order id (iFood)
    pub external_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// None for marketplace items without a catalog match
    pub product_id: Option<i64>,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub note: Option<String>,
    pub subtotal: f64,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Create order payload (built by the PDV cart or an integration mapper)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub source: OrderSource,
    pub order_type: OrderType,
    #[serde(default)]
    pub status: OrderStatus,
    pub mesa_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub subtotal: f64,
    pub discount: f64,
    pub service_fee: f64,
    pub delivery_fee: f64,
    pub total: f64,
    pub notes: Option<String>,
    pub external_id: Option<String>,
    pub items: Vec<OrderItemCreate>,
}

/// Create order line payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub note: Option<String>,
    pub subtotal: f64,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::SaiuEntrega).unwrap(),
            "\"saiu_entrega\""
        );
        for st in OrderStatus::ALL {
            let parsed: OrderStatus = st.as_str().parse().unwrap();
            assert_eq!(parsed, st);
        }
        assert!("desconhecido".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn open_statuses() {
        assert!(OrderStatus::Pendente.is_open());
        assert!(OrderStatus::Pronto.is_open());
        assert!(!OrderStatus::Entregue.is_open());
        assert!(!OrderStatus::Cancelado.is_open());
    }

    #[test]
    fn detail_flattens_order_fields() {
        let detail = OrderDetail {
            order: Order {
                id: 1,
                number: 12,
                source: OrderSource::Pdv,
                order_type: OrderType::Balcao,
                status: OrderStatus::Pendente,
                mesa_id: None,
                customer_name: None,
                customer_phone: None,
                delivery_address: None,
                payment_method: Some(PaymentMethod::Pix),
                subtotal: 10.0,
                discount: 0.0,
                service_fee: 0.0,
                delivery_fee: 0.0,
                total: 10.0,
                notes: None,
                external_id: None,
                created_at: 0,
                updated_at: 0,
            },
            items: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["number"], 12);
        assert_eq!(json["payment_method"], "pix");
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
