// Remote resource types for the commerce platform's admin API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog item status on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Active,
    Draft,
}

/// A catalog item as returned by the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ItemStatus,
}

/// Specification for creating a catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpec {
    pub title: String,
    /// Single identifying tag; the engine uses it as the idempotency key
    pub tag: String,
    pub vendor: String,
    pub product_type: String,
    pub status: ItemStatus,
}

/// Inventory policy of a SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryPolicy {
    /// Keep selling when tracked inventory reaches zero
    Continue,
    /// Stop selling at zero
    Deny,
}

impl fmt::Display for InventoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryPolicy::Continue => write!(f, "continue"),
            InventoryPolicy::Deny => write!(f, "deny"),
        }
    }
}

/// A purchasable SKU belonging to a catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sku {
    pub id: String,
    pub price_cents: i64,
    pub inventory_policy: InventoryPolicy,
}

/// Specification for creating an ephemeral discount rule
///
/// Rules issued by this engine are always single-use, per-customer,
/// time-boxed, non-combinable, and scoped to an explicit SKU list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRuleSpec {
    pub title: String,
    /// Fixed amount off, in cents
    pub value_cents: i64,
    /// Exactly the SKUs of the buyer's selection, never the full catalog
    pub entitled_sku_ids: Vec<String>,
    pub usage_limit: u32,
    pub once_per_customer: bool,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub combines_with_other_discounts: bool,
}

/// Summary of an existing discount rule, used by the cleanup sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRuleSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub usage_count: u32,
    pub usage_limit: Option<u32>,
}

/// A sales channel of the shop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub handle: String,
}
