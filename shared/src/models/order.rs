//! Order model as tracked by the fulfillment board

use serde::{Deserialize, Serialize};

/// Order category - selects which stage pipeline applies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCategory {
    /// Counter / dine-in service
    #[default]
    DineIn,
    /// Home delivery
    Delivery,
}

/// Line item snapshot - set at creation, never mutated by the board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product name
    pub name: String,
    /// Quantity
    pub quantity: i32,
    /// Unit price
    pub unit_price: f64,
}

/// Order snapshot held in the board collection
///
/// Only `stage` is mutable, and only through the engine's transition path.
/// Everything else is server-owned and passed through for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (assigned by server)
    pub id: String,
    /// Category, immutable; selects the stage pipeline
    pub category: OrderCategory,
    /// Current lifecycle stage id; unset until first assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Line items
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Server-provided monetary total
    #[serde(default)]
    pub total_amount: f64,
    /// Creation timestamp (epoch millis)
    pub submitted_at: i64,
    /// Owning fulfillment configuration id; routes persistence calls
    #[serde(default)]
    pub form_owner_id: String,
}

impl Order {
    /// Sum of line totals, for hosts without a server-provided total
    pub fn items_total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.unit_price * item.quantity as f64)
            .sum()
    }
}

/// Fetch filter for order collections
///
/// `table_id` is resolved server-side; the engine only forwards it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<OrderCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
}

impl OrderFilter {
    /// Filter scoped to one category
    pub fn for_category(category: OrderCategory) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Whether an order matches the locally checkable parts of this filter
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(category) = self.category
            && category != order.category
        {
            return false;
        }
        if let Some(owner) = &self.form_owner_id
            && *owner != order.form_owner_id
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, category: OrderCategory) -> Order {
        Order {
            id: id.to_string(),
            category,
            stage: None,
            items: vec![
                OrderItem {
                    name: "Marmita P".to_string(),
                    quantity: 2,
                    unit_price: 18.5,
                },
                OrderItem {
                    name: "Refrigerante".to_string(),
                    quantity: 1,
                    unit_price: 6.0,
                },
            ],
            total_amount: 43.0,
            submitted_at: 0,
            form_owner_id: "form-1".to_string(),
        }
    }

    #[test]
    fn test_items_total() {
        let order = order("o1", OrderCategory::Delivery);
        assert!((order.items_total() - 43.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_filter_matches_category() {
        let filter = OrderFilter::for_category(OrderCategory::Delivery);
        assert!(filter.matches(&order("o1", OrderCategory::Delivery)));
        assert!(!filter.matches(&order("o2", OrderCategory::DineIn)));
    }

    #[test]
    fn test_filter_matches_owner() {
        let filter = OrderFilter {
            form_owner_id: Some("form-2".to_string()),
            ..OrderFilter::default()
        };
        assert!(!filter.matches(&order("o1", OrderCategory::DineIn)));
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = OrderFilter::default();
        assert!(filter.matches(&order("o1", OrderCategory::DineIn)));
        assert!(filter.matches(&order("o2", OrderCategory::Delivery)));
    }

    #[test]
    fn test_order_serde_roundtrip() {
        let original = order("o1", OrderCategory::Delivery);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(original, parsed);
    }
}
