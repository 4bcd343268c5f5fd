use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Pricing mode for a bundle or a tier rule
///
/// Determines how a base amount is turned into the price the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Price is the sum of the selected items (no adjustment)
    Sum,

    /// Price is a fixed amount in cents, regardless of the selection
    Fixed,

    /// Price is the base minus a percentage of it
    DiscountPercent,

    /// Price is the base minus a fixed amount in cents
    DiscountAmount,
}

impl Default for PricingMode {
    fn default() -> Self {
        PricingMode::Sum
    }
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMode::Sum => "sum",
            PricingMode::Fixed => "fixed",
            PricingMode::DiscountPercent => "discount_percent",
            PricingMode::DiscountAmount => "discount_amount",
        }
    }
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quantity-threshold pricing override
///
/// When a buyer selects at least `min_quantity` items, the tier's mode
/// replaces the bundle-level mode entirely (they are never combined).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierRule {
    pub min_quantity: u32,
    pub mode: PricingMode,
    /// Cents for fixed/amount modes, whole percent for percent mode
    pub value: Option<i64>,
}

/// A catalog item that can be selected into a bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleItem {
    pub id: String,
    /// The remote catalog item this entry references
    pub catalog_item_id: String,
    /// Default purchasable SKU, used for discount entitlement scoping
    pub variant_id: String,
    /// Base price in cents
    pub base_price_cents: i64,
    pub min_quantity: u32,
    pub max_quantity: u32,
    /// Optional per-variant price table, keyed by variant id
    #[serde(default)]
    pub variant_prices: HashMap<String, i64>,
}

/// Kind of add-on a bundle can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnKind {
    Wrap,
    Card,
}

impl fmt::Display for AddOnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOnKind::Wrap => write!(f, "wrap"),
            AddOnKind::Card => write!(f, "card"),
        }
    }
}

/// Gift-wrap or card add-on; add-on prices are never discounted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOn {
    pub id: String,
    pub kind: AddOnKind,
    pub price_cents: i64,
}

/// A merchant-defined bundle, owned by the Bundle Configuration Store
///
/// Immutable for the duration of a single pricing computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub mode: PricingMode,
    /// Required for fixed and discount modes
    pub value: Option<i64>,
    #[serde(default)]
    pub tiers: Vec<TierRule>,
    pub items: Vec<BundleItem>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
}

impl BundleDefinition {
    /// Look up a bundle item by its id
    pub fn item(&self, item_id: &str) -> Option<&BundleItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Look up an add-on by its id
    pub fn add_on(&self, add_on_id: &str) -> Option<&AddOn> {
        self.add_ons.iter().find(|add_on| add_on.id == add_on_id)
    }
}

/// Subscription tier of a shop, as reported by the configuration store
///
/// Gates which add-ons and tiers are selectable upstream; the engine
/// trusts the selection it is given and uses the tier for telemetry only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanTier::Free => write!(f, "free"),
            PlanTier::Pro => write!(f, "pro"),
        }
    }
}
