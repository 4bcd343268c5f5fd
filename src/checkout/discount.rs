use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::bundles::models::BundleDefinition;
use crate::checkout::error::{CheckoutError, PricingError};
use crate::checkout::janitor::DiscountJanitor;
use crate::checkout::models::{PriceBreakdown, Selection};
use crate::platform::retry::with_rate_limit_retry;
use crate::platform::types::DiscountRuleSpec;
use crate::platform::CatalogApi;

/// Prefix of every code minted by this engine; the janitor filters on it
pub const CODE_PREFIX: &str = "BNDL-";

/// Title prefix marking rules as engine-owned for the sweep
pub const RULE_TITLE_PREFIX: &str = "Bundle checkout";

/// Lifetime of an ephemeral rule, and the sweep's age threshold
pub const RULE_TTL_MINUTES: i64 = 10;

const CODE_SUFFIX_LEN: usize = 8;

/// A minted discount, or the explicit nothing-to-discount result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedDiscount {
    pub code: Option<String>,
    pub rule_id: Option<String>,
    pub discount_cents: i64,
}

/// Issues single-use, SKU-scoped, time-boxed discount codes as the
/// alternative materialization path
#[derive(Clone)]
pub struct DiscountIssuer {
    catalog: Arc<dyn CatalogApi>,
    janitor: DiscountJanitor,
}

impl DiscountIssuer {
    pub fn new(catalog: Arc<dyn CatalogApi>, janitor: DiscountJanitor) -> Self {
        Self { catalog, janitor }
    }

    /// Issue a discount covering the gap between subtotal and discounted
    /// total; add-ons are never discounted and stay out of the rule
    pub async fn issue(
        &self,
        shop: &str,
        bundle: &BundleDefinition,
        selection: &Selection,
        breakdown: &PriceBreakdown,
    ) -> Result<IssuedDiscount, CheckoutError> {
        let discount_cents =
            (breakdown.product_subtotal - breakdown.discounted_product_total).max(0);

        // Bound the number of live rules before creating another one
        self.janitor.sweep(shop, RULE_TTL_MINUTES).await;

        if discount_cents == 0 {
            tracing::debug!("selection on {} needs no discount, skipping rule", shop);
            return Ok(IssuedDiscount {
                code: None,
                rule_id: None,
                discount_cents: 0,
            });
        }

        let entitled_sku_ids = entitled_sku_ids(bundle, selection)?;
        let code = generate_code();
        let now = Utc::now();
        let spec = DiscountRuleSpec {
            title: format!("{RULE_TITLE_PREFIX} {code}"),
            value_cents: discount_cents,
            entitled_sku_ids,
            usage_limit: 1,
            once_per_customer: true,
            starts_at: now,
            ends_at: now + Duration::minutes(RULE_TTL_MINUTES),
            combines_with_other_discounts: false,
        };

        let rule_id = with_rate_limit_retry(|| self.catalog.create_discount_rule(shop, &spec))
            .await
            .map_err(|err| {
                tracing::warn!("discount rule creation failed on {}: {}", shop, err);
                CheckoutError::DiscountIssuanceFailed
            })?;

        if let Err(err) =
            with_rate_limit_retry(|| self.catalog.create_discount_code(shop, &rule_id, &code)).await
        {
            tracing::warn!("attaching code to rule {} on {} failed: {}", rule_id, shop, err);
            // Leave no codeless orphan behind; the sweep would catch it
            // later, but the window is ten minutes
            if let Err(cleanup_err) = self.catalog.delete_discount_rule(shop, &rule_id).await {
                tracing::debug!("orphan rule {} cleanup failed: {}", rule_id, cleanup_err);
            }
            return Err(CheckoutError::DiscountIssuanceFailed);
        }

        tracing::info!(
            "issued discount code {} worth {} cents on {}",
            code,
            discount_cents,
            shop
        );
        Ok(IssuedDiscount {
            code: Some(code),
            rule_id: Some(rule_id),
            discount_cents,
        })
    }
}

/// Resolve the buyer's selection into the exact SKU list the rule is
/// entitled to: the chosen variant where one was picked, the item's
/// default SKU otherwise
fn entitled_sku_ids(
    bundle: &BundleDefinition,
    selection: &Selection,
) -> Result<Vec<String>, CheckoutError> {
    let mut sku_ids = Vec::with_capacity(selection.items.len());
    for selected in &selection.items {
        let item = bundle.item(&selected.item_id).ok_or_else(|| {
            PricingError::InvalidSelection(format!(
                "item {} is not part of bundle {}",
                selected.item_id, bundle.id
            ))
        })?;
        let sku_id = selected
            .variant_id
            .clone()
            .unwrap_or_else(|| item.variant_id.clone());
        sku_ids.push(sku_id);
    }
    Ok(sku_ids)
}

fn generate_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{CODE_PREFIX}{}", suffix.to_ascii_uppercase())
}
