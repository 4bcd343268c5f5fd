use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::checkout::error::CheckoutError;
use crate::platform::retry::with_rate_limit_retry;
use crate::platform::types::{InventoryPolicy, ItemSpec, ItemStatus};
use crate::platform::{CatalogApi, PlatformError};

/// Tag prefix of the reusable per-bundle charge item
pub const BUNDLE_CHARGE_TAG_PREFIX: &str = "bundle-charge";

/// Tag prefix of one-off fallback items dedicated to a single purchase
pub const BUNDLE_CHARGE_ONEOFF_TAG_PREFIX: &str = "bundle-charge-oneoff";

/// Vendor string marking charge items as internal add-ons
const CHARGE_ITEM_VENDOR: &str = "Bundle Engine";

/// Product type of charge items
const CHARGE_ITEM_TYPE: &str = "bundle-charge";

/// Stock level written alongside the continue-selling policy so the SKU
/// never reads as sold out while propagation lags
const UNLIMITED_STOCK: i64 = 1_000;

const DEFAULT_POLL_ATTEMPTS: u32 = 15;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(600);

/// Outcome of a materialization, distinguishing the reusable charge item
/// from the one-off fallback path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// The per-bundle charge item was reused or created
    Primary { sku_id: String },
    /// The charge-item path failed; a dedicated one-off item was created
    Fallback { sku_id: String },
}

impl Materialized {
    pub fn sku_id(&self) -> &str {
        match self {
            Materialized::Primary { sku_id } | Materialized::Fallback { sku_id } => sku_id,
        }
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self, Materialized::Fallback { .. })
    }
}

/// Guarantees a purchasable SKU exists at the resolved price
///
/// Reuses a tagged per-bundle charge item when possible, creates one
/// otherwise, publishes it to the online channel, overwrites its price,
/// and polls the storefront read path until the SKU is visible.
#[derive(Clone)]
pub struct SkuMaterializer {
    catalog: Arc<dyn CatalogApi>,
    poll_attempts: u32,
    poll_interval: Duration,
}

impl SkuMaterializer {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self {
            catalog,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the readiness-poll schedule
    pub fn with_poll(mut self, attempts: u32, interval: Duration) -> Self {
        self.poll_attempts = attempts;
        self.poll_interval = interval;
        self
    }

    /// Make `price_cents` purchasable for this bundle on this shop
    ///
    /// Returns `MaterializationFailed` only when the charge-item path and
    /// the one-off fallback both fail to produce a SKU id.
    pub async fn materialize(
        &self,
        shop: &str,
        bundle_id: &str,
        title: &str,
        price_cents: i64,
    ) -> Result<Materialized, CheckoutError> {
        let tag = format!("{BUNDLE_CHARGE_TAG_PREFIX}:{bundle_id}");
        match self.materialize_tagged(shop, &tag, title, price_cents).await {
            Ok(sku_id) => {
                self.await_readable(shop, &sku_id).await;
                Ok(Materialized::Primary { sku_id })
            }
            Err(err) => {
                tracing::warn!(
                    "charge-item materialization failed for {} on {}: {}; trying one-off fallback",
                    bundle_id,
                    shop,
                    err
                );
                let sku_id = self
                    .materialize_one_off(shop, title, price_cents)
                    .await
                    .map_err(|fallback_err| {
                        tracing::error!(
                            "one-off materialization also failed for {} on {}: {}",
                            bundle_id,
                            shop,
                            fallback_err
                        );
                        CheckoutError::MaterializationFailed
                    })?;
                self.await_readable(shop, &sku_id).await;
                Ok(Materialized::Fallback { sku_id })
            }
        }
    }

    /// Get-or-create the tagged charge item and point its SKU at the price
    async fn materialize_tagged(
        &self,
        shop: &str,
        tag: &str,
        title: &str,
        price_cents: i64,
    ) -> Result<String, PlatformError> {
        let existing = with_rate_limit_retry(|| self.catalog.find_item_by_tag(shop, tag)).await?;
        let item = match existing {
            Some(item) => item,
            None => {
                tracing::info!("creating charge item tagged {} on {}", tag, shop);
                let spec = ItemSpec {
                    title: title.to_string(),
                    tag: tag.to_string(),
                    vendor: CHARGE_ITEM_VENDOR.to_string(),
                    product_type: CHARGE_ITEM_TYPE.to_string(),
                    status: ItemStatus::Active,
                };
                with_rate_limit_retry(|| self.catalog.create_item(shop, &spec)).await?
            }
        };

        self.publish_best_effort(shop, &item.id).await;

        let skus = with_rate_limit_retry(|| self.catalog.list_skus(shop, &item.id)).await?;
        let sku_id = match skus.into_iter().next() {
            Some(sku) => {
                with_rate_limit_retry(|| {
                    self.catalog.update_sku_price(shop, &sku.id, price_cents)
                })
                .await?;
                sku.id
            }
            None => {
                let sku = with_rate_limit_retry(|| {
                    self.catalog
                        .create_sku(shop, &item.id, price_cents, InventoryPolicy::Continue)
                })
                .await?;
                sku.id
            }
        };
        with_rate_limit_retry(|| self.catalog.set_inventory(shop, &sku_id, UNLIMITED_STOCK))
            .await?;

        Ok(sku_id)
    }

    /// Fallback path: a brand-new, uniquely titled, timestamp-tagged item
    /// dedicated to this single purchase
    async fn materialize_one_off(
        &self,
        shop: &str,
        title: &str,
        price_cents: i64,
    ) -> Result<String, PlatformError> {
        let stamp = Utc::now().timestamp_millis();
        let spec = ItemSpec {
            title: format!("{title} #{stamp}"),
            tag: format!("{BUNDLE_CHARGE_ONEOFF_TAG_PREFIX}:{stamp}"),
            vendor: CHARGE_ITEM_VENDOR.to_string(),
            product_type: CHARGE_ITEM_TYPE.to_string(),
            status: ItemStatus::Active,
        };
        let item = with_rate_limit_retry(|| self.catalog.create_item(shop, &spec)).await?;

        self.publish_best_effort(shop, &item.id).await;

        let sku = with_rate_limit_retry(|| {
            self.catalog
                .create_sku(shop, &item.id, price_cents, InventoryPolicy::Continue)
        })
        .await?;
        with_rate_limit_retry(|| self.catalog.set_inventory(shop, &sku.id, UNLIMITED_STOCK))
            .await?;
        Ok(sku.id)
    }

    /// Publish to the online channel; failures are logged, not fatal. An
    /// unpublished SKU simply stays unreadable and exhausts the poll.
    async fn publish_best_effort(&self, shop: &str, item_id: &str) {
        let channel_id = match self.catalog.online_channel_id(shop).await {
            Ok(channel_id) => channel_id,
            Err(err) => {
                tracing::warn!("online channel lookup failed on {}: {}", shop, err);
                return;
            }
        };
        if let Err(err) = self.catalog.publish_item(shop, item_id, &channel_id).await {
            tracing::warn!("failed to publish item {} on {}: {}", item_id, shop, err);
        }
    }

    /// Bounded wait for read-after-write lag on the storefront path
    ///
    /// Optimistic: after exhausting the attempts the SKU id is still
    /// returned, since most lag resolves shortly after the window.
    async fn await_readable(&self, shop: &str, sku_id: &str) {
        for attempt in 1..=self.poll_attempts {
            match self.catalog.read_sku(shop, sku_id).await {
                Ok(true) => {
                    tracing::debug!("sku {} readable after {} attempt(s)", sku_id, attempt);
                    return;
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!("storefront read of {} failed: {}", sku_id, err);
                }
            }
            if attempt < self.poll_attempts {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
        tracing::warn!(
            "sku {} not readable after {} attempts; returning optimistically",
            sku_id,
            self.poll_attempts
        );
    }
}
