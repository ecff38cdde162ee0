//! Subscription Model (planos e cobrança)

use serde::{Deserialize, Serialize};

/// Subscription plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "plan", rename_all = "snake_case"))]
pub enum Plan {
    #[default]
    Basico,
    Profissional,
    Premium,
}

impl Plan {
    /// Employee limit; `None` is unlimited
    pub fn max_employees(&self) -> Option<i64> {
        match self {
            Self::Basico => Some(3),
            Self::Profissional => Some(15),
            Self::Premium => None,
        }
    }

    /// Active product limit; `None` is unlimited
    pub fn max_products(&self) -> Option<i64> {
        match self {
            Self::Basico => Some(50),
            Self::Profissional => Some(500),
            Self::Premium => None,
        }
    }

    /// Monthly price in centavos
    pub fn price_cents(&self) -> i64 {
        match self {
            Self::Basico => 4_990,
            Self::Profissional => 9_990,
            Self::Premium => 19_990,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basico => "basico",
            Self::Profissional => "profissional",
            Self::Premium => "premium",
        }
    }
}

/// Subscription status, as reported by the billing provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "subscription_status", rename_all = "snake_case")
)]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
}

impl SubscriptionStatus {
    /// Whether the tenant may keep using paid features
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Trialing | Self::Active | Self::PastDue)
    }

    /// Map a provider status string
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "trialing" | "future" => Some(Self::Trialing),
            "active" | "paid" => Some(Self::Active),
            "past_due" | "failed" | "pending" => Some(Self::PastDue),
            "canceled" | "cancelled" | "ended" => Some(Self::Canceled),
            "unpaid" => Some(Self::Unpaid),
            _ => None,
        }
    }
}

/// Trial length for newly registered restaurants
pub const TRIAL_DAYS: i64 = 14;

/// Subscription entity (one per restaurant)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Subscription {
    pub id: i64,
    pub restaurant_id: i64,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub provider_customer_id: Option<String>,
    pub provider_subscription_id: Option<String>,
    pub current_period_end: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Subscribe payload (card already tokenized by the billing provider's JS)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub plan: Plan,
    pub card_token: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_document: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_limits_grow() {
        assert_eq!(Plan::Basico.max_products(), Some(50));
        assert!(Plan::Profissional.max_employees() > Plan::Basico.max_employees());
        assert_eq!(Plan::Premium.max_products(), None);
    }

    #[test]
    fn provider_status_mapping() {
        assert_eq!(
            SubscriptionStatus::from_provider("active"),
            Some(SubscriptionStatus::Active)
        );
        assert_eq!(
            SubscriptionStatus::from_provider("canceled"),
            Some(SubscriptionStatus::Canceled)
        );
        assert_eq!(SubscriptionStatus::from_provider("weird"), None);
        assert!(!SubscriptionStatus::Unpaid.is_usable());
        assert!(SubscriptionStatus::PastDue.is_usable());
    }
}
