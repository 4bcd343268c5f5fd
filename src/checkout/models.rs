use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One chosen bundle item, with an optional variant override
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    #[schema(example = "soap-bar")]
    pub item_id: String,
    #[schema(example = "soap-bar-lavender")]
    pub variant_id: Option<String>,
}

/// Buyer input for one checkout attempt; request-scoped
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[validate(length(min = 1, message = "Selection must contain at least one item"))]
    pub items: Vec<SelectedItem>,
    pub wrap_id: Option<String>,
    pub card_id: Option<String>,
}

/// Deterministic result of pricing a selection; all values in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub product_subtotal: i64,
    pub discounted_product_total: i64,
    pub add_on_total: i64,
    pub grand_total: i64,
}

/// How the computed price should be made purchasable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// Materialize a priced SKU the cart can add directly
    Sku,
    /// Issue a single-use discount code scoped to the selection
    DiscountCode,
}

impl Default for CheckoutMode {
    fn default() -> Self {
        CheckoutMode::Sku
    }
}

/// Request body for POST /api/checkout
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[schema(example = "demo-store.example-commerce.com")]
    #[validate(custom = "crate::validation::validate_shop_domain")]
    pub shop: String,
    #[schema(example = "spa-day-bundle")]
    #[validate(length(min = 1, message = "bundleId must not be empty"))]
    pub bundle_id: String,
    #[serde(default)]
    pub mode: CheckoutMode,
    #[validate]
    pub selection: Selection,
}

/// Result of a checkout, before shaping into the wire response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Sku {
        sku_id: String,
        total_cents: i64,
        used_fallback: bool,
    },
    Discount {
        discount_cents: i64,
        code: Option<String>,
        rule_id: Option<String>,
    },
}

/// Cart-facing response for SKU-mode checkouts
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkuCheckoutResponse {
    #[schema(example = "sku-81231")]
    pub sku_id: String,
    #[schema(example = 2100)]
    pub total_cents: i64,
}

/// Cart-facing response for discount-mode checkouts
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCheckoutResponse {
    #[schema(example = "discount_code")]
    pub mode: String,
    #[schema(example = 200)]
    pub discount_cents: i64,
    #[schema(example = "BNDL-7KQ2M9XA")]
    pub discount_code: Option<String>,
    pub rule_id: Option<String>,
}

/// Order-completion event delivered by the webhook receiver
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCompletedEvent {
    #[schema(example = "demo-store.example-commerce.com")]
    pub shop: String,
    #[serde(default)]
    pub discount_codes_applied: Vec<String>,
}
